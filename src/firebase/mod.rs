//! Firebase adapters.
//!
//! `FirebaseApp` is built once at startup from [`Config`] and hands out the
//! Authentication and Firestore adapters. Both talk to the REST APIs with one
//! shared `reqwest::Client` and one shared [`Session`].

pub mod auth;
pub mod firestore;
pub mod session;

pub use auth::FirebaseAuth;
pub use firestore::Firestore;
pub use session::Session;

use crate::APP_USER_AGENT;
use anyhow::{Context, Result, bail};
use reqwest::Client;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com/v1";

/// Web app configuration, as shown in the Firebase console.
#[derive(Clone)]
pub struct Config {
    pub api_key: SecretString,
    pub auth_domain: Option<String>,
    pub database_url: Option<String>,
    pub project_id: String,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
    pub measurement_id: Option<String>,
    pub identity_endpoint: String,
    pub firestore_endpoint: String,
}

impl Config {
    #[must_use]
    pub fn new(api_key: SecretString, project_id: String) -> Self {
        Self {
            api_key,
            auth_domain: None,
            database_url: None,
            project_id,
            storage_bucket: None,
            messaging_sender_id: None,
            app_id: None,
            measurement_id: None,
            identity_endpoint: DEFAULT_IDENTITY_ENDPOINT.to_string(),
            firestore_endpoint: DEFAULT_FIRESTORE_ENDPOINT.to_string(),
        }
    }

    /// Where the provider redirects after a federated sign-in.
    #[must_use]
    pub fn auth_handler_uri(&self) -> String {
        let domain = self
            .auth_domain
            .clone()
            .unwrap_or_else(|| format!("{}.firebaseapp.com", self.project_id));
        format!("https://{domain}/__/auth/handler")
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"***")
            .field("auth_domain", &self.auth_domain)
            .field("database_url", &self.database_url)
            .field("project_id", &self.project_id)
            .field("storage_bucket", &self.storage_bucket)
            .field("messaging_sender_id", &self.messaging_sender_id)
            .field("app_id", &self.app_id)
            .field("measurement_id", &self.measurement_id)
            .field("identity_endpoint", &self.identity_endpoint)
            .field("firestore_endpoint", &self.firestore_endpoint)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct FirebaseApp {
    config: Config,
    http: Client,
    session: Session,
}

impl FirebaseApp {
    /// # Errors
    /// Returns an error if an endpoint is not an http(s) URL or the HTTP client cannot be built.
    pub fn initialize(config: Config) -> Result<Self> {
        check_endpoint("identity", &config.identity_endpoint)?;
        check_endpoint("firestore", &config.firestore_endpoint)?;

        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .context("Failed to build Firebase HTTP client")?;

        Ok(Self {
            config,
            http,
            session: Session::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn auth(&self) -> FirebaseAuth {
        FirebaseAuth::new(self.http.clone(), &self.config, self.session.clone())
    }

    #[must_use]
    pub fn firestore(&self) -> Firestore {
        Firestore::new(self.http.clone(), &self.config, self.session.clone())
    }
}

fn check_endpoint(name: &str, endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint).with_context(|| format!("Invalid {name} endpoint: {endpoint}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Invalid {name} endpoint: {endpoint} (expected http or https)");
    }
    Ok(())
}

/// Error body shared by the Google REST APIs.
#[derive(Deserialize, Debug)]
pub(crate) struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Pull the `error.message` (and `error.status`) out of a failed response body.
pub(crate) fn error_detail(body: &str) -> Option<ErrorDetail> {
    serde_json::from_str::<ErrorBody>(body).ok().map(|b| b.error)
}
