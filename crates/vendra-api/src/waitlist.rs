use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use tracing::error;

use vendra_types::api::{ErrorResponse, JoinWaitlistResponse, WaitlistCountResponse};

use crate::error::SignupError;
use crate::rate_limit::UNKNOWN_CLIENT;
use crate::signup::SignupWorkflow;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub signup: SignupWorkflow,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/waitlist", post(join_waitlist))
        .route("/api/waitlist/count", get(waitlist_count))
        .route("/health", get(health))
        .with_state(state)
}

/// Identify the caller for rate limiting: first `x-forwarded-for` hop,
/// then `x-real-ip`, then the shared `"unknown"` bucket.
pub fn client_identifier(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

pub async fn join_waitlist(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, SignupError> {
    let client_id = client_identifier(&headers);
    let outcome = state.signup.submit(&client_id, &body).await?;

    Ok(Json(JoinWaitlistResponse {
        success: true,
        entry: outcome.entry,
        position: outcome.position,
    }))
}

pub async fn waitlist_count(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let count = state.signup.waitlist_count().await.map_err(|e| {
        error!("Count error: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("Failed to retrieve count")),
        )
    })?;

    Ok(Json(WaitlistCountResponse { count }))
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
