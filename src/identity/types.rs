use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Collection holding one profile document per user.
pub const USERS_COLLECTION: &str = "users";

/// A user as reported by the identity provider.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl AuthUser {
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            email: None,
            email_verified: false,
            created_at: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

/// Result of a successful sign-in, returned to callers unchanged.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserCredential {
    pub user: AuthUser,
    pub provider_id: String,
    #[serde(default)]
    pub is_new_user: bool,
}

/// Result of registering with email and password.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub uid: String,
    pub user: AuthUser,
}

/// Federated provider used for popup-style sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedProvider {
    pub provider_id: String,
    pub custom_parameters: BTreeMap<String, String>,
}

impl FederatedProvider {
    /// Google with forced account selection.
    #[must_use]
    pub fn google() -> Self {
        Self {
            provider_id: "google.com".to_string(),
            custom_parameters: BTreeMap::from([(
                "prompt".to_string(),
                "select_account".to_string(),
            )]),
        }
    }
}

/// First leg of a federated sign-in: where to send the user.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthUri {
    pub auth_uri: String,
    pub provider_id: String,
    pub session_id: Option<String>,
}

/// Second leg of a federated sign-in: what the provider redirected back with.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FederatedCallback {
    pub request_uri: String,
    pub post_body: String,
    pub session_id: Option<String>,
}

impl FederatedCallback {
    /// The user closed the popup or the provider redirected back with an error.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.post_body.trim().is_empty()
            || self
                .post_body
                .split('&')
                .any(|pair| pair.starts_with("error="))
    }
}

/// Location of a document in the store.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    pub collection: String,
    pub id: String,
}

impl DocumentRef {
    #[must_use]
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    #[must_use]
    pub fn user(uid: &str) -> Self {
        Self::new(USERS_COLLECTION, uid)
    }

    #[must_use]
    pub fn path(&self) -> String {
        format!("{}/{}", self.collection, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_provider_forces_account_selection() {
        let provider = FederatedProvider::google();
        assert_eq!(provider.provider_id, "google.com");
        assert_eq!(
            provider.custom_parameters.get("prompt").map(String::as_str),
            Some("select_account")
        );
    }

    #[test]
    fn callback_cancelled_when_empty_or_error() {
        assert!(FederatedCallback::default().is_cancelled());

        let denied = FederatedCallback {
            request_uri: "https://izz.firebaseapp.com/__/auth/handler".to_string(),
            post_body: "state=abc&error=access_denied".to_string(),
            session_id: None,
        };
        assert!(denied.is_cancelled());

        let ok = FederatedCallback {
            request_uri: "https://izz.firebaseapp.com/__/auth/handler".to_string(),
            post_body: "code=4/0Ad&state=abc".to_string(),
            session_id: Some("session".to_string()),
        };
        assert!(!ok.is_cancelled());
    }

    #[test]
    fn document_ref_path() {
        assert_eq!(DocumentRef::user("uid-1").path(), "users/uid-1");
    }

    #[test]
    fn auth_user_serializes_camel_case() {
        let user = AuthUser::new("uid-1")
            .with_email("a@x.com")
            .with_display_name("Ada");
        let json = serde_json::to_value(&user).unwrap_or_default();
        assert_eq!(json["displayName"], "Ada");
        assert_eq!(json["emailVerified"], false);
    }
}
