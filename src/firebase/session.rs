use crate::identity::AuthUser;
use secrecy::SecretString;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
struct SignedIn {
    user: AuthUser,
    id_token: SecretString,
}

/// The provider's ambient "current user", shared by the auth and store adapters.
///
/// The id token lives in memory only.
#[derive(Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<Option<SignedIn>>>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn replace(&self, user: AuthUser, id_token: SecretString) {
        *self.inner.write().await = Some(SignedIn { user, id_token });
    }

    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }

    pub async fn current_user(&self) -> Option<AuthUser> {
        self.inner.read().await.as_ref().map(|s| s.user.clone())
    }

    /// Id token of the signed-in user, if `uid` is the one signed in.
    pub async fn id_token_for(&self, uid: &str) -> Option<SecretString> {
        self.inner
            .read()
            .await
            .as_ref()
            .filter(|s| s.user.uid == uid)
            .map(|s| s.id_token.clone())
    }

    /// Id token of whoever is signed in.
    pub async fn id_token(&self) -> Option<SecretString> {
        self.inner.read().await.as_ref().map(|s| s.id_token.clone())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("tokens", &"***").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[tokio::test]
    async fn tokens_are_scoped_to_signed_in_uid() {
        let session = Session::new();
        assert!(session.current_user().await.is_none());

        session
            .replace(AuthUser::new("uid-1"), SecretString::from("id-token".to_string()))
            .await;

        assert_eq!(
            session.current_user().await.map(|u| u.uid).as_deref(),
            Some("uid-1")
        );
        assert_eq!(
            session
                .id_token_for("uid-1")
                .await
                .map(|t| t.expose_secret().to_string())
                .as_deref(),
            Some("id-token")
        );
        assert!(session.id_token_for("uid-2").await.is_none());

        session.clear().await;
        assert!(session.id_token().await.is_none());
    }

    #[test]
    fn debug_redacts_tokens() {
        assert_eq!(format!("{:?}", Session::new()), "Session { tokens: \"***\" }");
    }
}
