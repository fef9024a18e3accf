//! Chat endpoints.
//!
//! - `POST /api/chat/send`: one conversation step
//! - `GET /api/chat/sessions/:id`: session history
//! - `DELETE /api/chat/sessions/:id`: end a session

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::ConversationTurn;
use crate::pipeline::{Degradation, ResponseSource};

#[derive(Deserialize)]
pub struct ChatSendRequest {
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatSendResponse {
    /// `None` for a blank message sent outside any session.
    pub session_id: Option<Uuid>,
    pub response: String,
    pub source: ResponseSource,
    pub degradations: Vec<Degradation>,
    pub history: Vec<ConversationTurn>,
}

#[derive(Serialize)]
pub struct SessionHistoryResponse {
    pub session_id: Uuid,
    pub history: Vec<ConversationTurn>,
}

/// `POST /api/chat/send`
///
/// Blank messages are answered with the fixed prompt (status 200); the
/// session history is left as it was and no session is opened.
pub async fn send(
    State(ctx): State<ApiContext>,
    Json(req): Json<ChatSendRequest>,
) -> Result<Json<ChatSendResponse>, ApiError> {
    let requested = req.session_id.as_deref().map(parse_session_id).transpose()?;

    // Translation and generation are blocking HTTP calls.
    let core = ctx.core.clone();
    let (session_id, outcome) =
        tokio::task::spawn_blocking(move || core.chat(requested, &req.message)).await??;

    Ok(Json(ChatSendResponse {
        session_id,
        response: outcome.response,
        source: outcome.source,
        degradations: outcome.degradations,
        history: outcome.history,
    }))
}

/// `GET /api/chat/sessions/:id`
pub async fn history(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<SessionHistoryResponse>, ApiError> {
    let session_id = parse_session_id(&id)?;
    let history = ctx.core.history(&session_id)?;
    Ok(Json(SessionHistoryResponse {
        session_id,
        history,
    }))
}

/// `DELETE /api/chat/sessions/:id`
pub async fn end(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session_id = parse_session_id(&id)?;
    ctx.core.end_session(&session_id)?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_session_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid session id: {raw}")))
}
