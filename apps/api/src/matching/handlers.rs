use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::orchestrator::{
    apply_to_match, get_matches, toggle_bookmark, MatchListResponse,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchQuery {
    #[serde(default)]
    pub refresh: bool,
    #[serde(default = "default_match_limit")]
    pub limit: i64,
}

fn default_match_limit() -> i64 {
    20
}

#[derive(Serialize)]
pub struct BookmarkResponse {
    pub is_bookmarked: bool,
}

#[derive(Serialize)]
pub struct ApplyResponse {
    pub message: String,
    pub match_id: Uuid,
}

/// GET /api/chat/sessions/:id/matches
pub async fn handle_get_matches(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(params): Query<MatchQuery>,
) -> Result<Json<MatchListResponse>, AppError> {
    let response = get_matches(
        &state.db,
        state.gateway.as_ref(),
        session_id,
        params.refresh,
        params.limit,
    )
    .await?;
    Ok(Json(response))
}

/// POST /api/matches/:id/bookmark
pub async fn handle_toggle_bookmark(
    State(state): State<AppState>,
    Path(match_id): Path<Uuid>,
) -> Result<Json<BookmarkResponse>, AppError> {
    Ok(Json(BookmarkResponse {
        is_bookmarked: toggle_bookmark(&state.db, match_id).await?,
    }))
}

/// POST /api/matches/:id/apply
pub async fn handle_apply(
    State(state): State<AppState>,
    Path(match_id): Path<Uuid>,
) -> Result<Json<ApplyResponse>, AppError> {
    apply_to_match(&state.db, match_id).await?;
    Ok(Json(ApplyResponse {
        message: "지원 완료".to_string(),
        match_id,
    }))
}
