//! `/auth` handlers.
//!
//! Every successful sign-in provisions the user's profile document before
//! answering, so the client can read `/auth/profile/{uid}` right away.

use super::{ApiError, Message, payload};
use crate::identity::{
    AuthUri, FederatedCallback, IdentityClient, Registration, UserCredential,
    document::fields_to_json,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct PasswordReset {
    pub email: Option<String>,
}

#[derive(IntoParams, Deserialize, Debug, Default)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct FederatedStart {
    /// Where the provider should send the user back to.
    pub continue_uri: Option<String>,
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = Credentials,
    responses(
        (status = 201, description = "User registered", body = Registration),
        (status = 400, description = "Missing fields or rejected by the provider", body = Message),
    ),
    tag = "auth",
)]
#[instrument(skip_all)]
pub async fn register(
    identity: Extension<Arc<IdentityClient>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let credentials = payload(body)?;

    let registration = identity
        .register(
            credentials.email.as_deref().unwrap_or_default(),
            credentials.password.as_deref().unwrap_or_default(),
        )
        .await?;

    identity
        .provision_profile(Some(&registration.user), Map::new())
        .await?;

    Ok((StatusCode::CREATED, Json(registration)))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = Credentials,
    responses(
        (status = 200, description = "Signed in", body = UserCredential),
        (status = 400, description = "Missing fields or rejected by the provider", body = Message),
    ),
    tag = "auth",
)]
#[instrument(skip_all)]
pub async fn login(
    identity: Extension<Arc<IdentityClient>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let credentials = payload(body)?;

    let credential = identity
        .sign_in(
            credentials.email.as_deref().unwrap_or_default(),
            credentials.password.as_deref().unwrap_or_default(),
        )
        .await?;

    identity
        .provision_profile(Some(&credential.user), Map::new())
        .await?;

    Ok((StatusCode::OK, Json(credential)))
}

#[utoipa::path(
    get,
    path = "/auth/google",
    params(FederatedStart),
    responses(
        (status = 200, description = "Where to send the user for Google sign-in", body = AuthUri),
        (status = 502, description = "Provider unavailable", body = Message),
    ),
    tag = "auth",
)]
#[instrument(skip_all)]
pub async fn google_start(
    identity: Extension<Arc<IdentityClient>>,
    Query(params): Query<FederatedStart>,
) -> Result<impl IntoResponse, ApiError> {
    let auth_uri = identity
        .federated_auth_uri(params.continue_uri.as_deref())
        .await?;

    Ok((StatusCode::OK, Json(auth_uri)))
}

#[utoipa::path(
    post,
    path = "/auth/google",
    request_body = FederatedCallback,
    responses(
        (status = 200, description = "Signed in with Google", body = UserCredential),
        (status = 400, description = "Cancelled or rejected by the provider", body = Message),
    ),
    tag = "auth",
)]
#[instrument(skip_all)]
pub async fn google_finish(
    identity: Extension<Arc<IdentityClient>>,
    body: Result<Json<FederatedCallback>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let callback = payload(body)?;

    let credential = identity.sign_in_with_federated(&callback).await?;

    identity
        .provision_profile(Some(&credential.user), Map::new())
        .await?;

    Ok((StatusCode::OK, Json(credential)))
}

#[utoipa::path(
    post,
    path = "/auth/reset-password",
    request_body = PasswordReset,
    responses(
        (status = 200, description = "Reset email sent", body = Message),
        (status = 400, description = "Missing email or rejected by the provider", body = Message),
    ),
    tag = "auth",
)]
#[instrument(skip_all)]
pub async fn reset_password(
    identity: Extension<Arc<IdentityClient>>,
    body: Result<Json<PasswordReset>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = payload(body)?;

    let message = identity
        .send_password_reset(request.email.as_deref().unwrap_or_default())
        .await?;

    Ok((StatusCode::OK, Json(Message::new(message))))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session forgotten", body = Message),
    ),
    tag = "auth",
)]
#[instrument(skip_all)]
pub async fn logout(identity: Extension<Arc<IdentityClient>>) -> impl IntoResponse {
    identity.sign_out().await;

    (StatusCode::OK, Json(Message::new("Signed out")))
}

#[utoipa::path(
    get,
    path = "/auth/profile/{uid}",
    params(
        ("uid" = String, Path, description = "User id"),
    ),
    responses(
        (status = 200, description = "Profile document fields"),
        (status = 404, description = "No profile for this user", body = Message),
    ),
    tag = "auth",
)]
#[instrument(skip(identity))]
pub async fn profile(
    identity: Extension<Arc<IdentityClient>>,
    Path(uid): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    match identity.profile(&uid).await? {
        Some(document) => {
            let mut fields = fields_to_json(document.fields);
            fields.insert("uid".to_string(), Value::String(uid));
            Ok((StatusCode::OK, Json(Value::Object(fields))))
        }
        None => Err(ApiError::new(StatusCode::NOT_FOUND, "User not found")),
    }
}
