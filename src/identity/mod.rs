//! Identity client.
//!
//! Mediates every authentication operation between the HTTP handlers and the
//! external identity provider, and lazily provisions one profile document per
//! user in the document store. The provider and the store are capability
//! traits so the client runs unchanged against Firebase or in-memory fakes.
//!
//! Profile provisioning is check-then-create. Two first logins for the same
//! uid racing each other both see "absent"; the store's create-only write
//! keeps the winner's document and the loser treats the conflict as already
//! provisioned.

pub mod document;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use document::{Document, FieldValue, Fields};
pub use types::{
    AuthUri, AuthUser, DocumentRef, FederatedCallback, FederatedProvider, Registration,
    UserCredential,
};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

pub const PASSWORD_RESET_SENT: &str = "Check your email for the password reset link.";
pub const EMAIL_UPDATED: &str = "Email updated successfully";
pub const VERIFICATION_SENT: &str = "Verification email sent. Please verify your new email.";

/// Failure reported by the identity provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("no signed-in session for this user")]
    NoSession,
    #[error("identity provider unreachable: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failure reported by the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("document store unreachable: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid document: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid document reference: {0}")]
    InvalidReference(String),
}

impl StoreError {
    /// A create-only write found the document already there.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::Api { status: 409, .. })
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Email and password are required")]
    MissingCredentials,
    #[error("Email is required")]
    MissingEmail,
    #[error("Federated sign-in was cancelled")]
    FederatedCancelled,
    #[error("No user is currently signed in or UID mismatch")]
    SessionMismatch,
    #[error("Password reset failed: {0}")]
    PasswordReset(#[source] ProviderError),
    #[error("Error updating email: {0}")]
    UpdateEmail(#[source] ProviderError),
    #[error("Error sending verification email: {0}")]
    Verification(#[source] ProviderError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Operations the external identity provider offers.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_auth_uri(
        &self,
        provider: &FederatedProvider,
        continue_uri: Option<&str>,
    ) -> Result<AuthUri, ProviderError>;

    async fn sign_in_with_idp(
        &self,
        provider: &FederatedProvider,
        callback: &FederatedCallback,
    ) -> Result<UserCredential, ProviderError>;

    async fn send_password_reset_email(&self, email: &str) -> Result<(), ProviderError>;

    async fn create_user_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserCredential, ProviderError>;

    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserCredential, ProviderError>;

    /// The user of the provider's ambient session, if any.
    async fn current_user(&self) -> Option<AuthUser>;

    async fn update_email(&self, user: &AuthUser, new_email: &str) -> Result<(), ProviderError>;

    async fn send_email_verification(&self, user: &AuthUser) -> Result<(), ProviderError>;

    /// Forget the ambient session.
    async fn sign_out(&self);
}

/// Read and create-only write of single documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, reference: &DocumentRef) -> Result<Option<Document>, StoreError>;

    /// Fails if the document already exists.
    async fn create(&self, reference: &DocumentRef, fields: Fields) -> Result<(), StoreError>;
}

pub struct IdentityClient {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    federated: FederatedProvider,
}

impl std::fmt::Debug for IdentityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityClient")
            .field("federated", &self.federated.provider_id)
            .finish_non_exhaustive()
    }
}

impl IdentityClient {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            provider,
            store,
            federated: FederatedProvider::google(),
        }
    }

    /// Start a popup-style federated sign-in.
    ///
    /// # Errors
    /// Returns the provider error unchanged.
    #[instrument(skip(self))]
    pub async fn federated_auth_uri(
        &self,
        continue_uri: Option<&str>,
    ) -> Result<AuthUri, IdentityError> {
        Ok(self
            .provider
            .create_auth_uri(&self.federated, continue_uri)
            .await?)
    }

    /// Finish a federated sign-in with what the provider redirected back.
    ///
    /// # Errors
    /// `FederatedCancelled` if the flow was abandoned, otherwise the provider error unchanged.
    #[instrument(skip_all)]
    pub async fn sign_in_with_federated(
        &self,
        callback: &FederatedCallback,
    ) -> Result<UserCredential, IdentityError> {
        if callback.is_cancelled() {
            debug!("federated sign-in cancelled");
            return Err(IdentityError::FederatedCancelled);
        }

        Ok(self
            .provider
            .sign_in_with_idp(&self.federated, callback)
            .await?)
    }

    /// # Errors
    /// `MissingEmail` for an empty address, `PasswordReset` wrapping the provider error.
    #[instrument(skip(self))]
    pub async fn send_password_reset(&self, email: &str) -> Result<&'static str, IdentityError> {
        if email.is_empty() {
            return Err(IdentityError::MissingEmail);
        }

        self.provider
            .send_password_reset_email(email)
            .await
            .map_err(IdentityError::PasswordReset)?;

        Ok(PASSWORD_RESET_SENT)
    }

    /// # Errors
    /// `MissingCredentials` before any provider call, otherwise the provider error unchanged.
    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> Result<Registration, IdentityError> {
        if email.is_empty() || password.is_empty() {
            return Err(IdentityError::MissingCredentials);
        }

        let credential = self
            .provider
            .create_user_with_email_and_password(email, password)
            .await?;

        info!(uid = %credential.user.uid, "user registered");

        Ok(Registration {
            uid: credential.user.uid.clone(),
            user: credential.user,
        })
    }

    /// # Errors
    /// `MissingCredentials` before any provider call, otherwise the provider error unchanged.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserCredential, IdentityError> {
        if email.is_empty() || password.is_empty() {
            return Err(IdentityError::MissingCredentials);
        }

        Ok(self
            .provider
            .sign_in_with_email_and_password(email, password)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn sign_out(&self) {
        self.provider.sign_out().await;
    }

    /// Change the signed-in user's email address.
    ///
    /// # Errors
    /// `SessionMismatch` unless `uid` is the provider's current user, `UpdateEmail` on provider failure.
    #[instrument(skip(self))]
    pub async fn update_email(&self, uid: &str, new_email: &str) -> Result<&'static str, IdentityError> {
        let user = self.signed_in_as(uid, new_email).await?;

        self.provider
            .update_email(&user, new_email)
            .await
            .map_err(IdentityError::UpdateEmail)?;

        Ok(EMAIL_UPDATED)
    }

    /// Change the signed-in user's email address and ask them to verify it.
    ///
    /// # Errors
    /// `SessionMismatch` unless `uid` is the provider's current user, `Verification` if either step fails.
    #[instrument(skip(self))]
    pub async fn update_email_and_verify(
        &self,
        uid: &str,
        new_email: &str,
    ) -> Result<&'static str, IdentityError> {
        let user = self.signed_in_as(uid, new_email).await?;

        self.provider
            .update_email(&user, new_email)
            .await
            .map_err(IdentityError::Verification)?;

        self.provider
            .send_email_verification(&user)
            .await
            .map_err(IdentityError::Verification)?;

        Ok(VERIFICATION_SENT)
    }

    async fn signed_in_as(&self, uid: &str, new_email: &str) -> Result<AuthUser, IdentityError> {
        let user = match self.provider.current_user().await {
            Some(user) if user.uid == uid => user,
            _ => return Err(IdentityError::SessionMismatch),
        };

        if new_email.is_empty() {
            return Err(IdentityError::MissingEmail);
        }

        Ok(user)
    }

    /// Create the user's profile document unless it already exists.
    ///
    /// `additional` is merged over `displayName`, `email` and `createdAt`.
    /// Returns `None` only when no user was given.
    ///
    /// # Errors
    /// Store read or write failures; write failures are logged first. A
    /// write that loses to a concurrent create is not an error.
    #[instrument(skip_all, fields(uid = user.map(|u| u.uid.as_str())))]
    pub async fn provision_profile(
        &self,
        user: Option<&AuthUser>,
        additional: Map<String, Value>,
    ) -> Result<Option<DocumentRef>, IdentityError> {
        let Some(user) = user else {
            return Ok(None);
        };

        let reference = DocumentRef::user(&user.uid);

        if self.store.get(&reference).await?.is_none() {
            let mut fields = Fields::new();
            fields.insert(
                "displayName".to_string(),
                FieldValue::from(user.display_name.clone()),
            );
            fields.insert("email".to_string(), FieldValue::from(user.email.clone()));
            fields.insert("createdAt".to_string(), FieldValue::from(Utc::now()));
            fields.extend(document::fields_from_json(additional));

            match self.store.create(&reference, fields).await {
                Ok(()) => info!(document = %reference.path(), "user document created"),
                Err(e) if e.is_already_exists() => {
                    debug!(document = %reference.path(), "user document created concurrently");
                }
                Err(e) => {
                    error!("Error creating user document: {e}");
                    return Err(e.into());
                }
            }
        }

        Ok(Some(reference))
    }

    /// # Errors
    /// Store read failures.
    #[instrument(skip(self))]
    pub async fn profile(&self, uid: &str) -> Result<Option<Document>, IdentityError> {
        Ok(self.store.get(&DocumentRef::user(uid)).await?)
    }
}
