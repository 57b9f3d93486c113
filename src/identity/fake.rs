//! In-memory stand-ins for the identity provider and the document store.

use super::{
    AuthUri, AuthUser, Document, DocumentRef, DocumentStore, FederatedCallback, FederatedProvider,
    Fields, IdentityProvider, ProviderError, StoreError, UserCredential,
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

#[derive(Default)]
pub struct FakeProvider {
    accounts: Mutex<HashMap<String, (String, AuthUser)>>,
    current: Mutex<Option<AuthUser>>,
    failure: Mutex<Option<(Option<&'static str>, String)>>,
    calls: AtomicUsize,
    pub verifications: AtomicUsize,
}

impl FakeProvider {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every subsequent provider call fail with `message`.
    pub fn fail_with(&self, message: &str) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some((None, message.to_string()));
        }
    }

    /// Make only calls to `operation` fail with `message`.
    pub fn fail_on(&self, operation: &'static str, message: &str) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some((Some(operation), message.to_string()));
        }
    }

    pub fn sign_in_as(&self, user: AuthUser) {
        if let Ok(mut current) = self.current.lock() {
            *current = Some(user);
        }
    }

    fn enter(&self, operation: &'static str) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().ok().and_then(|f| f.clone()) {
            Some((target, message)) if target.is_none_or(|t| t == operation) => {
                Err(ProviderError::Api {
                    status: 400,
                    message,
                })
            }
            _ => Ok(()),
        }
    }

    fn credential(&self, user: AuthUser, provider_id: &str, is_new_user: bool) -> UserCredential {
        self.sign_in_as(user.clone());
        UserCredential {
            user,
            provider_id: provider_id.to_string(),
            is_new_user,
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn create_auth_uri(
        &self,
        provider: &FederatedProvider,
        _continue_uri: Option<&str>,
    ) -> Result<AuthUri, ProviderError> {
        self.enter("create_auth_uri")?;
        Ok(AuthUri {
            auth_uri: "https://accounts.google.com/o/oauth2/auth?prompt=select_account".to_string(),
            provider_id: provider.provider_id.clone(),
            session_id: Some("session-1".to_string()),
        })
    }

    async fn sign_in_with_idp(
        &self,
        provider: &FederatedProvider,
        _callback: &FederatedCallback,
    ) -> Result<UserCredential, ProviderError> {
        self.enter("sign_in_with_idp")?;
        let user = AuthUser::new("google-uid")
            .with_email("g@x.com")
            .with_display_name("Grace");
        Ok(self.credential(user, &provider.provider_id, true))
    }

    async fn send_password_reset_email(&self, _email: &str) -> Result<(), ProviderError> {
        self.enter("send_password_reset_email")
    }

    async fn create_user_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserCredential, ProviderError> {
        self.enter("create_user_with_email_and_password")?;
        let mut accounts = self.accounts.lock().map_err(|_| ProviderError::NoSession)?;
        if accounts.contains_key(email) {
            return Err(ProviderError::Api {
                status: 400,
                message: "Firebase: Error (auth/email-already-in-use).".to_string(),
            });
        }
        let user = AuthUser::new(format!("uid-{}", accounts.len() + 1)).with_email(email);
        accounts.insert(email.to_string(), (password.to_string(), user.clone()));
        drop(accounts);
        Ok(self.credential(user, "password", true))
    }

    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserCredential, ProviderError> {
        self.enter("sign_in_with_email_and_password")?;
        let user = self
            .accounts
            .lock()
            .ok()
            .and_then(|accounts| accounts.get(email).cloned())
            .filter(|(stored, _)| stored == password)
            .map(|(_, user)| user)
            .ok_or_else(|| ProviderError::Api {
                status: 400,
                message: "Firebase: Error (auth/invalid-credential).".to_string(),
            })?;
        Ok(self.credential(user, "password", false))
    }

    async fn current_user(&self) -> Option<AuthUser> {
        self.current.lock().ok().and_then(|current| current.clone())
    }

    async fn update_email(&self, user: &AuthUser, new_email: &str) -> Result<(), ProviderError> {
        self.enter("update_email")?;
        self.sign_in_as(user.clone().with_email(new_email));
        Ok(())
    }

    async fn send_email_verification(&self, _user: &AuthUser) -> Result<(), ProviderError> {
        self.enter("send_email_verification")?;
        self.verifications.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn sign_out(&self) {
        if let Ok(mut current) = self.current.lock() {
            *current = None;
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Document>>,
    writes: AtomicUsize,
    fail_writes: Mutex<bool>,
    hide_reads: Mutex<bool>,
}

impl MemoryStore {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.documents.lock().map(|docs| docs.len()).unwrap_or_default()
    }

    pub fn fail_writes(&self) {
        if let Ok(mut fail) = self.fail_writes.lock() {
            *fail = true;
        }
    }

    /// Report every document as absent on read, as a concurrent first login sees it.
    pub fn hide_reads(&self) {
        if let Ok(mut hide) = self.hide_reads.lock() {
            *hide = true;
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, reference: &DocumentRef) -> Result<Option<Document>, StoreError> {
        if self.hide_reads.lock().map(|hide| *hide).unwrap_or_default() {
            return Ok(None);
        }
        Ok(self
            .documents
            .lock()
            .ok()
            .and_then(|docs| docs.get(&reference.path()).cloned()))
    }

    async fn create(&self, reference: &DocumentRef, fields: Fields) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.lock().map(|fail| *fail).unwrap_or_default() {
            return Err(StoreError::Api {
                status: 403,
                message: "PERMISSION_DENIED: Missing or insufficient permissions.".to_string(),
            });
        }

        let mut docs = self.documents.lock().map_err(|_| StoreError::Api {
            status: 500,
            message: "poisoned".to_string(),
        })?;
        if docs.contains_key(&reference.path()) {
            return Err(StoreError::Api {
                status: 409,
                message: format!("ALREADY_EXISTS: Document already exists: {}", reference.path()),
            });
        }
        docs.insert(reference.path(), Document::from_fields(fields));
        Ok(())
    }
}
