use super::{ApiError, Message, payload};
use crate::identity::IdentityClient;
use axum::{
    Extension, Json, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmailChange {
    /// Must be the uid of the currently signed-in user.
    pub uid: Option<String>,
    pub new_email: Option<String>,
}

#[utoipa::path(
    post,
    path = "/update/email",
    request_body = EmailChange,
    responses(
        (status = 200, description = "Email updated", body = Message),
        (status = 400, description = "Missing email or rejected by the provider", body = Message),
        (status = 401, description = "Not the signed-in user", body = Message),
    ),
    tag = "update",
)]
#[instrument(skip_all)]
pub async fn email(
    identity: Extension<Arc<IdentityClient>>,
    body: Result<Json<EmailChange>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let change = payload(body)?;

    let message = identity
        .update_email(
            change.uid.as_deref().unwrap_or_default(),
            change.new_email.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok((StatusCode::OK, Json(Message::new(message))))
}

#[utoipa::path(
    post,
    path = "/update/email/verify",
    request_body = EmailChange,
    responses(
        (status = 200, description = "Email updated and verification sent", body = Message),
        (status = 400, description = "Missing email or rejected by the provider", body = Message),
        (status = 401, description = "Not the signed-in user", body = Message),
    ),
    tag = "update",
)]
#[instrument(skip_all)]
pub async fn email_verify(
    identity: Extension<Arc<IdentityClient>>,
    body: Result<Json<EmailChange>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let change = payload(body)?;

    let message = identity
        .update_email_and_verify(
            change.uid.as_deref().unwrap_or_default(),
            change.new_email.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok((StatusCode::OK, Json(Message::new(message))))
}
