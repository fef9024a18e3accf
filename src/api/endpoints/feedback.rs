//! Feedback endpoints.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{FeedbackRecord, FeedbackStats};

#[derive(Deserialize)]
pub struct FeedbackRequest {
    pub query: String,
    pub response: String,
    pub is_helpful: bool,
    #[serde(default)]
    pub user_comment: Option<String>,
}

/// `POST /api/feedback`: append one record and persist the whole file.
pub async fn submit(
    State(ctx): State<ApiContext>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<FeedbackRecord>, ApiError> {
    let core = ctx.core.clone();
    let record = tokio::task::spawn_blocking(move || {
        core.submit_feedback(
            &req.query,
            &req.response,
            req.is_helpful,
            req.user_comment.as_deref(),
        )
    })
    .await??;

    Ok(Json(record))
}

/// `GET /api/feedback/stats`
pub async fn stats(State(ctx): State<ApiContext>) -> Result<Json<FeedbackStats>, ApiError> {
    Ok(Json(ctx.core.feedback_stats()?))
}
