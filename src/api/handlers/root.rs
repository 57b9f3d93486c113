use super::Message;
use axum::{Json, http::StatusCode, response::IntoResponse};

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Liveness message", body = Message),
    ),
    tag = "izz",
)]
pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, Json(Message::new("Hello, from izz")))
}
