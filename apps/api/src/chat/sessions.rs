//! Chat session pipeline.
//!
//! Creating a session seeds the hidden coaching prompt and stores the first
//! assistant greeting. Every user message is answered through the gateway,
//! after which the candidate profile is re-extracted from the full history
//! and upserted. Both paths work identically whether the gateway answered
//! remotely or from the local fallback.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::chat::prompts::COACH_SYSTEM_PROMPT;
use crate::errors::AppError;
use crate::inference::{ChatTurn, InferenceGateway};
use crate::models::chat::{ChatMessageRow, ChatSessionRow};
use crate::models::profile::CandidateProfile;
use crate::profile::{load_profile, store_profile};

pub const DEFAULT_SESSION_TITLE: &str = "AI 매칭 세션";
pub const SESSION_NOT_FOUND: &str = "채팅 세션을 찾을 수 없습니다.";

/// Response for session creation: the opening turns plus any stored profile.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<ChatMessageRow>,
    pub profile: Option<CandidateProfile>,
}

/// Response for one user/assistant exchange.
#[derive(Debug, Serialize)]
pub struct ExchangeResponse {
    pub user_message: ChatMessageRow,
    pub assistant_message: ChatMessageRow,
    pub profile: Option<CandidateProfile>,
}

/// Loads a session or fails with the Korean not-found message.
pub async fn ensure_session(pool: &PgPool, session_id: Uuid) -> Result<ChatSessionRow, AppError> {
    sqlx::query_as::<_, ChatSessionRow>("SELECT * FROM chat_sessions WHERE id = $1")
        .bind(session_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(SESSION_NOT_FOUND.to_string()))
}

/// Conversation history in chronological order, shaped for the gateway.
pub async fn fetch_history(pool: &PgPool, session_id: Uuid) -> Result<Vec<ChatTurn>, AppError> {
    Ok(sqlx::query_as::<_, ChatTurn>(
        "SELECT role, content FROM chat_messages WHERE session_id = $1 ORDER BY created_at ASC",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?)
}

async fn insert_message(
    pool: &PgPool,
    session_id: Uuid,
    role: &str,
    content: &str,
    metadata: Option<serde_json::Value>,
) -> Result<ChatMessageRow, AppError> {
    Ok(sqlx::query_as::<_, ChatMessageRow>(
        r#"
        INSERT INTO chat_messages (id, session_id, role, content, metadata)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(session_id)
    .bind(role)
    .bind(content)
    .bind(metadata)
    .fetch_one(pool)
    .await?)
}

/// Opens a session, seeds the coaching prompt, and stores the first
/// assistant greeting.
pub async fn create_session(
    pool: &PgPool,
    gateway: &dyn InferenceGateway,
    user_id: Option<Uuid>,
    title: Option<String>,
) -> Result<SessionResponse, AppError> {
    let title = title.unwrap_or_else(|| DEFAULT_SESSION_TITLE.to_string());

    let session = sqlx::query_as::<_, ChatSessionRow>(
        r#"
        INSERT INTO chat_sessions (id, user_id, title, status)
        VALUES ($1, $2, $3, 'active')
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&title)
    .fetch_one(pool)
    .await?;

    let system_message =
        insert_message(pool, session.id, "system", COACH_SYSTEM_PROMPT, None).await?;

    let history = fetch_history(pool, session.id).await?;
    let reply = gateway.generate_reply(&history).await;

    let assistant_message = insert_message(
        pool,
        session.id,
        "assistant",
        &reply.value.content,
        Some(json!({ "suggested_topics": &reply.value.suggested_topics })),
    )
    .await?;

    sqlx::query("UPDATE chat_sessions SET last_message_at = NOW(), updated_at = NOW() WHERE id = $1")
        .bind(session.id)
        .execute(pool)
        .await?;

    info!("Created chat session {}", session.id);

    // A brand-new session has no profile row yet; read anyway so the
    // response shape is uniform.
    let profile = load_profile(pool, session.id).await?;

    Ok(SessionResponse {
        session_id: session.id,
        title: session.title,
        created_at: session.created_at,
        messages: vec![system_message, assistant_message],
        profile,
    })
}

/// Appends a user turn, answers it, and refreshes the candidate profile
/// from the full conversation.
pub async fn send_message(
    pool: &PgPool,
    gateway: &dyn InferenceGateway,
    session_id: Uuid,
    content: &str,
) -> Result<ExchangeResponse, AppError> {
    ensure_session(pool, session_id).await?;

    let user_message = insert_message(pool, session_id, "user", content, None).await?;

    let history = fetch_history(pool, session_id).await?;
    let reply = gateway.generate_reply(&history).await;

    let assistant_message = insert_message(
        pool,
        session_id,
        "assistant",
        &reply.value.content,
        Some(json!({ "suggested_topics": &reply.value.suggested_topics })),
    )
    .await?;

    // Re-extract over the history including the turn just answered.
    let full_history = fetch_history(pool, session_id).await?;
    let extracted = gateway.extract_profile(&full_history).await;
    let profile = store_profile(pool, session_id, extracted.value).await?;

    Ok(ExchangeResponse {
        user_message,
        assistant_message,
        profile,
    })
}

/// Messages for a session in chronological order.
pub async fn list_messages(
    pool: &PgPool,
    session_id: Uuid,
) -> Result<Vec<ChatMessageRow>, AppError> {
    ensure_session(pool, session_id).await?;

    Ok(sqlx::query_as::<_, ChatMessageRow>(
        "SELECT * FROM chat_messages WHERE session_id = $1 ORDER BY created_at ASC",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?)
}
