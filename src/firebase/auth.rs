//! Firebase Authentication over the Identity Toolkit REST API.

use super::{Config, Session, error_detail};
use crate::identity::{
    AuthUri, AuthUser, FederatedCallback, FederatedProvider, IdentityProvider, ProviderError,
    UserCredential,
};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use tracing::{Instrument, debug, info_span, instrument};

/// `accounts:*` response fields shared by sign-up, sign-in, IdP sign-in and update.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
struct AccountResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    id_token: Option<String>,
    email_verified: bool,
    provider_id: Option<String>,
    is_new_user: bool,
    error_message: Option<String>,
}

impl AccountResponse {
    fn user(&self) -> AuthUser {
        AuthUser {
            uid: self.local_id.clone(),
            display_name: self.display_name.clone().filter(|name| !name.is_empty()),
            email: self.email.clone().filter(|email| !email.is_empty()),
            email_verified: self.email_verified,
            created_at: None,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CreateAuthUriResponse {
    auth_uri: String,
    provider_id: Option<String>,
    session_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Clone)]
pub struct FirebaseAuth {
    http: Client,
    endpoint: String,
    api_key: SecretString,
    auth_handler_uri: String,
    session: Session,
}

impl std::fmt::Debug for FirebaseAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseAuth")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"***")
            .field("auth_handler_uri", &self.auth_handler_uri)
            .finish_non_exhaustive()
    }
}

impl FirebaseAuth {
    #[must_use]
    pub fn new(http: Client, config: &Config, session: Session) -> Self {
        Self {
            http,
            endpoint: config.identity_endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            auth_handler_uri: config.auth_handler_uri(),
            session,
        }
    }

    async fn call<B, R>(&self, method: &str, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/accounts:{method}", self.endpoint);
        let span = info_span!("identity.call", rpc.method = method);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(body)
            .send()
            .instrument(span)
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_detail(&text).map_or_else(
                || format!("{url} - {status}"),
                |detail| render_error(&detail.message),
            );
            debug!("{method} failed: {status} {message}");

            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    async fn signed_in(&self, account: AccountResponse, fallback_provider: &str) -> UserCredential {
        let user = account.user();
        if let Some(id_token) = account.id_token {
            self.session
                .replace(user.clone(), SecretString::from(id_token))
                .await;
        }

        UserCredential {
            user,
            provider_id: account
                .provider_id
                .unwrap_or_else(|| fallback_provider.to_string()),
            is_new_user: account.is_new_user,
        }
    }

    async fn id_token_for(&self, user: &AuthUser) -> Result<SecretString, ProviderError> {
        self.session
            .id_token_for(&user.uid)
            .await
            .ok_or(ProviderError::NoSession)
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    #[instrument(skip(self, provider), fields(provider = %provider.provider_id))]
    async fn create_auth_uri(
        &self,
        provider: &FederatedProvider,
        continue_uri: Option<&str>,
    ) -> Result<AuthUri, ProviderError> {
        let body = json!({
            "providerId": provider.provider_id,
            "continueUri": continue_uri.unwrap_or(&self.auth_handler_uri),
            "customParameter": provider.custom_parameters,
        });
        let response: CreateAuthUriResponse = self.call("createAuthUri", &body).await?;

        Ok(AuthUri {
            auth_uri: response.auth_uri,
            provider_id: response
                .provider_id
                .unwrap_or_else(|| provider.provider_id.clone()),
            session_id: response.session_id,
        })
    }

    #[instrument(skip_all, fields(provider = %provider.provider_id))]
    async fn sign_in_with_idp(
        &self,
        provider: &FederatedProvider,
        callback: &FederatedCallback,
    ) -> Result<UserCredential, ProviderError> {
        let body = json!({
            "requestUri": callback.request_uri,
            "postBody": callback.post_body,
            "sessionId": callback.session_id,
            "returnSecureToken": true,
            "returnIdpCredential": true,
        });
        let account: AccountResponse = self.call("signInWithIdp", &body).await?;

        // The IdP leg can answer 200 and still refuse the sign-in.
        if let Some(code) = &account.error_message {
            return Err(ProviderError::Api {
                status: 400,
                message: render_error(code),
            });
        }

        Ok(self.signed_in(account, &provider.provider_id).await)
    }

    #[instrument(skip(self))]
    async fn send_password_reset_email(&self, email: &str) -> Result<(), ProviderError> {
        let body = json!({ "requestType": "PASSWORD_RESET", "email": email });
        let _: serde_json::Value = self.call("sendOobCode", &body).await?;
        Ok(())
    }

    #[instrument(skip(self, password))]
    async fn create_user_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserCredential, ProviderError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let mut account: AccountResponse = self.call("signUp", &body).await?;
        account.is_new_user = true;

        Ok(self.signed_in(account, "password").await)
    }

    #[instrument(skip(self, password))]
    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserCredential, ProviderError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let account: AccountResponse = self.call("signInWithPassword", &body).await?;

        Ok(self.signed_in(account, "password").await)
    }

    async fn current_user(&self) -> Option<AuthUser> {
        self.session.current_user().await
    }

    #[instrument(skip(self, user), fields(uid = %user.uid))]
    async fn update_email(&self, user: &AuthUser, new_email: &str) -> Result<(), ProviderError> {
        let id_token = self.id_token_for(user).await?;
        let body = json!({
            "idToken": id_token.expose_secret(),
            "email": new_email,
            "returnSecureToken": true,
        });
        let account: AccountResponse = self.call("update", &body).await?;

        let mut updated = user.clone();
        updated.email = account.email.or_else(|| Some(new_email.to_string()));
        updated.email_verified = false;
        let id_token = account.id_token.map_or(id_token, SecretString::from);
        self.session.replace(updated, id_token).await;

        Ok(())
    }

    #[instrument(skip(self, user), fields(uid = %user.uid))]
    async fn send_email_verification(&self, user: &AuthUser) -> Result<(), ProviderError> {
        let id_token = self.id_token_for(user).await?;
        let body = json!({
            "requestType": "VERIFY_EMAIL",
            "idToken": id_token.expose_secret(),
        });
        let _: serde_json::Value = self.call("sendOobCode", &body).await?;
        Ok(())
    }

    async fn sign_out(&self) {
        self.session.clear().await;
    }
}

/// Render an Identity Toolkit error the way the web SDK does:
/// `EMAIL_EXISTS` becomes `Firebase: Error (auth/email-already-in-use).`
#[must_use]
pub fn render_error(server_message: &str) -> String {
    let (code, detail) = match server_message.split_once(" : ") {
        Some((code, detail)) => (code.trim(), Some(detail.trim())),
        None => (server_message.trim(), None),
    };

    let auth_code = match code {
        "EMAIL_EXISTS" => "email-already-in-use".to_string(),
        "EMAIL_NOT_FOUND" => "user-not-found".to_string(),
        "INVALID_PASSWORD" => "wrong-password".to_string(),
        "INVALID_LOGIN_CREDENTIALS" | "INVALID_IDP_RESPONSE" => "invalid-credential".to_string(),
        "USER_DISABLED" => "user-disabled".to_string(),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "too-many-requests".to_string(),
        "INVALID_ID_TOKEN" => "invalid-user-token".to_string(),
        "TOKEN_EXPIRED" => "user-token-expired".to_string(),
        "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => "requires-recent-login".to_string(),
        "USER_CANCELLED" => "popup-closed-by-user".to_string(),
        "FEDERATED_USER_ID_ALREADY_LINKED" => "credential-already-in-use".to_string(),
        "API_KEY_INVALID" => "api-key-not-valid".to_string(),
        other => other.to_lowercase().replace('_', "-"),
    };

    match detail {
        Some(detail) => format!("Firebase: {detail} (auth/{auth_code})."),
        None => format!("Firebase: Error (auth/{auth_code})."),
    }
}
