//! HTTP request handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;

use crate::reconcile::coordinator::Outcome;
use crate::reconcile::signature::SIGNATURE_HEADER;
use crate::server::state::ServerState;
use crate::utils::{version_info, LOGO_URL, REPOSITORY_URL};

/// Webhook handler.
///
/// The body is taken as raw bytes so the signature is checked against exactly
/// what the sender signed.
pub async fn webhook_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let result = state.coordinator.reconcile(&body, signature).await;
    outcome_response(&result.outcome)
}

/// Map an outcome to its status code and literal body
pub fn outcome_response(outcome: &Outcome) -> Response {
    (outcome_status(outcome), outcome.message()).into_response()
}

pub fn outcome_status(outcome: &Outcome) -> StatusCode {
    if outcome.is_success() {
        StatusCode::OK
    } else if outcome.is_rejection() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Liveness check handler
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Info response
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub msg: String,
    pub url: String,
    pub logo: String,
    pub time: String,
    pub uptime: u64,
    pub version: String,
    pub git_hash: String,
}

/// Info handler
pub async fn info_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let version = version_info();
    Json(InfoResponse {
        msg: "Hi this is Blaze. Ready to receive webhooks. Find out more about Blaze on GitHub."
            .to_string(),
        url: REPOSITORY_URL.to_string(),
        logo: LOGO_URL.to_string(),
        time: Utc::now().to_rfc3339(),
        uptime: state.started_at.elapsed().as_secs(),
        version: version.version,
        git_hash: version.git_hash,
    })
}

/// Not found response
#[derive(Debug, Serialize)]
pub struct NotFoundResponse {
    pub msg: String,
    pub path: String,
    pub method: String,
    pub error: String,
}

/// Fallback for unknown routes
pub async fn not_found_handler(method: Method, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(NotFoundResponse {
            msg: "Hi this is Blaze. Ready to receive webhooks.".to_string(),
            path: uri.path().to_string(),
            method: method.to_string(),
            error: "page not found".to_string(),
        }),
    )
}
