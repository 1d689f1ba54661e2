//! HTTP server setup

use std::future::Future;
use std::sync::Arc;

use axum::{
    http::{header::HeaderName, HeaderValue},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::options::ServerOptions;
use crate::errors::BlazeError;
use crate::server::handlers::{health_handler, info_handler, not_found_handler, webhook_handler};
use crate::server::state::ServerState;

/// Build the router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(info_handler).post(webhook_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-powered-by"),
            HeaderValue::from_static("Blaze"),
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
pub async fn serve(
    options: &ServerOptions,
    state: Arc<ServerState>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<JoinHandle<Result<(), BlazeError>>, BlazeError> {
    let app = router(state);

    let addr = format!("{}:{}", options.host, options.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| BlazeError::ServerError(format!("Failed to bind {}: {}", addr, e)))?;
    info!("Ready to receive webhooks on {}", addr);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| BlazeError::ServerError(e.to_string()))
    });

    Ok(handle)
}
