//! HTTP edge.
//!
//! Mounts the `/auth` and `/update` groups, serves `/uploads` from disk and,
//! in production, the built client with an `index.html` fallback. Anything
//! else is `404 {"message":"Route not found"}`.

use crate::identity::IdentityClient;
use anyhow::Result;
use axum::{
    Extension, Router,
    body::Body,
    extract::{MatchedPath, Request},
    handler::HandlerWithoutStateExt,
    http::{HeaderName, HeaderValue},
    routing::{get, post},
};
use std::{path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    services::ServeDir,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, error, info, info_span};
use ulid::Ulid;
use utoipa::OpenApi;

pub mod handlers;
mod openapi;


use handlers::{auth, fallback, health, root, update};

/// Where static content comes from.
#[derive(Debug, Clone)]
pub struct EdgeConfig {
    pub production: bool,
    pub static_dir: PathBuf,
    pub uploads_dir: PathBuf,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            production: false,
            static_dir: PathBuf::from("client/build"),
            uploads_dir: PathBuf::from("uploads"),
        }
    }
}

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    openapi::ApiDoc::openapi()
}

/// Build the application with all routes and middleware.
pub fn router(identity: Arc<IdentityClient>, edge: &EdgeConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(Any);

    let uploads = ServeDir::new(&edge.uploads_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(fallback::not_found.into_service());

    let app = Router::new()
        .route("/", get(root::root))
        .route("/health", get(health::health).options(health::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route(
            "/auth/google",
            get(auth::google_start).post(auth::google_finish),
        )
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/profile/{uid}", get(auth::profile))
        .route("/update/email", post(update::email))
        .route("/update/email/verify", post(update::email_verify))
        .nest_service("/uploads", uploads)
        .method_not_allowed_fallback(fallback::not_found);

    let app = if edge.production {
        let static_dir = edge.static_dir.clone();
        app.fallback(move |request: Request| fallback::spa(static_dir.clone(), request))
    } else {
        app.fallback(fallback::not_found)
    };

    app.layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(cors)
            .layer(Extension(identity)),
    )
}

/// Bind the port and serve until Ctrl-C or SIGTERM.
/// # Errors
/// Returns an error if the server fails to start
pub async fn new(port: u16, identity: Arc<IdentityClient>, edge: EdgeConfig) -> Result<()> {
    let app = router(identity, &edge);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = route,
        request_id
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}
