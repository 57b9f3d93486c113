//! Cloud Firestore over the REST API.
//!
//! Requests carry the signed-in user's id token when there is one, so the
//! project's security rules see the same principal the web SDK would.

use super::{Config, Session, error_detail};
use crate::identity::{Document, DocumentRef, DocumentStore, Fields, StoreError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

#[derive(Clone)]
pub struct Firestore {
    http: Client,
    documents_url: String,
    api_key: SecretString,
    session: Session,
}

impl std::fmt::Debug for Firestore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Firestore")
            .field("documents_url", &self.documents_url)
            .finish_non_exhaustive()
    }
}

impl Firestore {
    #[must_use]
    pub fn new(http: Client, config: &Config, session: Session) -> Self {
        Self {
            http,
            documents_url: format!(
                "{}/projects/{}/databases/(default)/documents",
                config.firestore_endpoint.trim_end_matches('/'),
                config.project_id
            ),
            api_key: config.api_key.clone(),
            session,
        }
    }

    /// `documents_url` followed by `segments`, each percent-encoded as one path segment.
    fn document_url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        if let Some(bad) = segments
            .iter()
            .find(|segment| matches!(**segment, "" | "." | ".."))
        {
            return Err(StoreError::InvalidReference(format!("{bad:?}")));
        }

        let mut url = Url::parse(&self.documents_url)
            .map_err(|e| StoreError::InvalidReference(format!("{}: {e}", self.documents_url)))?;
        url.path_segments_mut()
            .map_err(|()| StoreError::InvalidReference(self.documents_url.clone()))?
            .extend(segments);
        Ok(url)
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.query(&[("key", self.api_key.expose_secret())]);
        match self.session.id_token().await {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }
}

async fn api_error(response: reqwest::Response) -> StoreError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = match error_detail(&text) {
        Some(detail) => match detail.status {
            Some(code) => format!("{code}: {}", detail.message),
            None => detail.message,
        },
        None => status.to_string(),
    };

    StoreError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl DocumentStore for Firestore {
    #[instrument(skip(self), fields(document = %reference.path()))]
    async fn get(&self, reference: &DocumentRef) -> Result<Option<Document>, StoreError> {
        let url = self.document_url(&[reference.collection.as_str(), reference.id.as_str()])?;
        let response = self.authorized(self.http.get(url)).await.send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!("document not found");
                Ok(None)
            }
            status if status.is_success() => {
                let body = response.bytes().await?;
                Ok(Some(serde_json::from_slice(&body)?))
            }
            _ => Err(api_error(response).await),
        }
    }

    #[instrument(skip(self, fields), fields(document = %reference.path()))]
    async fn create(&self, reference: &DocumentRef, fields: Fields) -> Result<(), StoreError> {
        let url = self.document_url(&[reference.collection.as_str()])?;
        if matches!(reference.id.as_str(), "" | "." | "..") || reference.id.contains('/') {
            return Err(StoreError::InvalidReference(reference.path()));
        }
        let request = self
            .http
            .post(url)
            .query(&[("documentId", reference.id.as_str())])
            .json(&json!({ "fields": fields }));
        let response = self.authorized(request).await.send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(api_error(response).await)
        }
    }
}
