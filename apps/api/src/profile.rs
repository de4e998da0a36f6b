//! Candidate profile persistence.
//!
//! The profile is re-extracted from the full conversation after every user
//! message and upserted keyed on the session; an empty extraction is a no-op
//! so a stored profile is never wiped by a failed remote call returning `{}`.
//! Reads are lenient: NULL or malformed JSONB blocks degrade to empty blocks
//! instead of failing the request.

use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::chat::sessions::fetch_history;
use crate::errors::AppError;
use crate::inference::{ExtractedProfile, InferenceGateway};
use crate::models::profile::{CandidateProfile, CandidateProfileRow};

/// Upserts the freshly extracted profile for a session.
///
/// Returns `None` without touching the database when the extraction is
/// empty. On success the session row also gets the new summary and a
/// `last_message_at` bump.
pub async fn store_profile(
    pool: &PgPool,
    session_id: Uuid,
    extracted: ExtractedProfile,
) -> Result<Option<CandidateProfile>, AppError> {
    if extracted.is_empty() {
        return Ok(None);
    }

    let skills = serde_json::to_value(&extracted.skills).map_err(anyhow::Error::from)?;
    let experiences = serde_json::to_value(&extracted.experiences).map_err(anyhow::Error::from)?;
    let preferences = serde_json::to_value(&extracted.preferences).map_err(anyhow::Error::from)?;

    sqlx::query(
        r#"
        INSERT INTO candidate_profiles
            (id, session_id, headline, summary, strengths, improvements,
             skills, experiences, preferences, last_generated_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW())
        ON CONFLICT (session_id) DO UPDATE
        SET headline = EXCLUDED.headline,
            summary = EXCLUDED.summary,
            strengths = EXCLUDED.strengths,
            improvements = EXCLUDED.improvements,
            skills = EXCLUDED.skills,
            experiences = EXCLUDED.experiences,
            preferences = EXCLUDED.preferences,
            last_generated_at = NOW(),
            updated_at = NOW()
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(session_id)
    .bind(&extracted.headline)
    .bind(&extracted.summary)
    .bind(&extracted.strengths)
    .bind(&extracted.improvements)
    .bind(&skills)
    .bind(&experiences)
    .bind(&preferences)
    .execute(pool)
    .await?;

    sqlx::query(
        "UPDATE chat_sessions SET summary = $2, last_message_at = NOW(), updated_at = NOW() WHERE id = $1",
    )
    .bind(session_id)
    .bind(&extracted.summary)
    .execute(pool)
    .await?;

    Ok(Some(CandidateProfile::from(extracted)))
}

/// Reads the stored profile for a session, if one exists.
pub async fn load_profile(
    pool: &PgPool,
    session_id: Uuid,
) -> Result<Option<CandidateProfile>, AppError> {
    let row = sqlx::query_as::<_, CandidateProfileRow>(
        "SELECT * FROM candidate_profiles WHERE session_id = $1",
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_profile))
}

/// Returns the stored profile, extracting one on first access.
///
/// A session with no usable conversation still yields an empty profile
/// object rather than an error, so match scoring always has an input.
pub async fn ensure_profile(
    pool: &PgPool,
    gateway: &dyn InferenceGateway,
    session_id: Uuid,
) -> Result<CandidateProfile, AppError> {
    if let Some(profile) = load_profile(pool, session_id).await? {
        return Ok(profile);
    }

    info!("No stored profile for session {session_id}, extracting from conversation");
    let history = fetch_history(pool, session_id).await?;
    let extracted = gateway.extract_profile(&history).await;
    store_profile(pool, session_id, extracted.value).await?;

    Ok(load_profile(pool, session_id).await?.unwrap_or_default())
}

fn row_to_profile(row: CandidateProfileRow) -> CandidateProfile {
    CandidateProfile {
        headline: row.headline,
        summary: row.summary,
        strengths: row.strengths.unwrap_or_default(),
        improvements: row.improvements.unwrap_or_default(),
        skills: parse_block(row.skills),
        experiences: parse_block(row.experiences),
        preferences: parse_block(row.preferences),
        last_generated_at: row.last_generated_at,
    }
}

/// JSONB column to typed block. NULL and schema mismatches both come back
/// as the empty block.
fn parse_block<T: DeserializeOwned + Default>(value: Option<Value>) -> T {
    value
        .map(|v| serde_json::from_value(v).unwrap_or_default())
        .unwrap_or_default()
}
