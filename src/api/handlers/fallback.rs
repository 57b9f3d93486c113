use super::Message;
use axum::{
    Json,
    extract::Request,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use std::path::PathBuf;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

pub const ROUTE_NOT_FOUND: &str = "Route not found";

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(Message::new(ROUTE_NOT_FOUND)))
}

/// Serve the client bundle; unknown paths get `index.html` so client-side routing works.
/// Anything but `GET`/`HEAD` is a plain 404.
pub async fn spa(static_dir: PathBuf, request: Request) -> Response {
    if !matches!(*request.method(), Method::GET | Method::HEAD) {
        return not_found().await.into_response();
    }

    let index = ServeFile::new(static_dir.join("index.html"));
    match ServeDir::new(&static_dir)
        .fallback(index)
        .oneshot(request)
        .await
    {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}
