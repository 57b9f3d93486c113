pub mod auth;
pub mod fallback;
pub mod health;
pub mod root;
pub mod update;

use crate::identity::{IdentityError, ProviderError, StoreError};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

/// Body of every informational and error response.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failed request, rendered as `{"message": ...}` with a matching status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(Message::new(self.message))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("rejected request body: {rejection}");
        Self::new(StatusCode::BAD_REQUEST, "Missing payload")
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        let status = match &err {
            IdentityError::MissingCredentials
            | IdentityError::MissingEmail
            | IdentityError::FederatedCancelled
            | IdentityError::Store(StoreError::InvalidReference(_)) => StatusCode::BAD_REQUEST,
            IdentityError::SessionMismatch => StatusCode::UNAUTHORIZED,
            IdentityError::PasswordReset(e)
            | IdentityError::UpdateEmail(e)
            | IdentityError::Verification(e)
            | IdentityError::Provider(e) => provider_status(e),
            IdentityError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("{err}");
        } else {
            debug!("{err}");
        }

        Self::new(status, err.to_string())
    }
}

fn provider_status(err: &ProviderError) -> StatusCode {
    match err {
        ProviderError::Api { status, .. } if (400..500).contains(status) => {
            StatusCode::BAD_REQUEST
        }
        ProviderError::NoSession => StatusCode::UNAUTHORIZED,
        ProviderError::Api { .. } | ProviderError::Http(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Unwrap a JSON body or answer `400 Missing payload`.
pub(crate) fn payload<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    Ok(body?.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(message: &str, status: u16) -> ProviderError {
        ProviderError::Api {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn identity_errors_map_to_statuses() {
        let cases = [
            (IdentityError::MissingCredentials, StatusCode::BAD_REQUEST),
            (IdentityError::MissingEmail, StatusCode::BAD_REQUEST),
            (IdentityError::FederatedCancelled, StatusCode::BAD_REQUEST),
            (IdentityError::SessionMismatch, StatusCode::UNAUTHORIZED),
            (
                IdentityError::Provider(api("Firebase: Error (auth/invalid-credential).", 400)),
                StatusCode::BAD_REQUEST,
            ),
            (
                IdentityError::UpdateEmail(api("Internal error", 503)),
                StatusCode::BAD_GATEWAY,
            ),
            (
                IdentityError::Verification(ProviderError::NoSession),
                StatusCode::UNAUTHORIZED,
            ),
            (
                IdentityError::Store(StoreError::Api {
                    status: 403,
                    message: "PERMISSION_DENIED".to_string(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                IdentityError::Store(StoreError::InvalidReference("\"..\"".to_string())),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status, expected);
        }
    }

    #[test]
    fn error_message_is_the_display_text() {
        let err = ApiError::from(IdentityError::PasswordReset(api(
            "Firebase: Error (auth/user-not-found).",
            400,
        )));
        assert_eq!(
            err.message,
            "Password reset failed: Firebase: Error (auth/user-not-found)."
        );
    }
}
