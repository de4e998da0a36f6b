use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::sessions::{
    create_session, ensure_session, list_messages, send_message, ExchangeResponse,
    SessionResponse,
};
use crate::errors::AppError;
use crate::models::chat::ChatMessageRow;
use crate::models::profile::CandidateProfile;
use crate::profile::load_profile;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub profile: Option<CandidateProfile>,
}

/// POST /api/chat/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let response =
        create_session(&state.db, state.gateway.as_ref(), req.user_id, req.title).await?;
    Ok(Json(response))
}

/// GET /api/chat/sessions/:id/messages
pub async fn handle_list_messages(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessageRow>>, AppError> {
    Ok(Json(list_messages(&state.db, session_id).await?))
}

/// POST /api/chat/sessions/:id/messages
pub async fn handle_send_message(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<ExchangeResponse>, AppError> {
    if req.content.is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }

    let response =
        send_message(&state.db, state.gateway.as_ref(), session_id, &req.content).await?;
    Ok(Json(response))
}

/// GET /api/chat/sessions/:id/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, AppError> {
    ensure_session(&state.db, session_id).await?;

    Ok(Json(ProfileResponse {
        profile: load_profile(&state.db, session_id).await?,
    }))
}
