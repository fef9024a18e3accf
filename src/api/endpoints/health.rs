//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub generator_available: bool,
    pub canned_answers: usize,
    pub open_sessions: usize,
}

/// `GET /api/health`
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    // Availability probes the model server over blocking HTTP.
    let core = ctx.core.clone();
    let generator_available = tokio::task::spawn_blocking(move || core.generator_available()).await?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        generator_available,
        canned_answers: ctx.core.response_count(),
        open_sessions: ctx.core.session_count()?,
    }))
}
