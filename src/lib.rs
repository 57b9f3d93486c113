//! # izz
//!
//! Backend for the izz task dashboard. It serves a small JSON API and, in
//! production, the compiled single-page client.
//!
//! ## Identity
//!
//! Authentication is delegated to Firebase Authentication and every user gets
//! one profile document in the Firestore `users` collection, created lazily
//! on first sign-in. The [`identity::IdentityClient`] owns that logic and talks
//! to the outside world only through the [`identity::IdentityProvider`] and
//! [`identity::DocumentStore`] traits; [`firebase`] implements both over the
//! Google REST APIs.
//!
//! ## Session
//!
//! Like the browser SDK, the provider keeps a single ambient "current user".
//! Email updates act on that session and are refused unless the caller names
//! the same uid.

pub mod api;
pub mod cli;
pub mod firebase;
pub mod identity;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert_eq!(
            APP_USER_AGENT,
            format!("izz/{}", env!("CARGO_PKG_VERSION"))
        );
    }
}
