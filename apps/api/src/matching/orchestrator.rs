//! Match orchestration.
//!
//! Matches are computed lazily: the first read for a session (or an explicit
//! refresh) scores the newest active postings through the gateway and upserts
//! the results; every read then returns the stored rows ranked by score.
//! Bookmark/applied flags live only on the stored rows and are never touched
//! by a recompute.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::chat::sessions::ensure_session;
use crate::errors::AppError;
use crate::inference::InferenceGateway;
use crate::models::jobs::{JobPostingRow, MatchAnalysis};
use crate::models::profile::CandidateProfile;
use crate::profile::ensure_profile;

/// Upper bound on postings scored in one recompute pass.
const MAX_POSTINGS_PER_REFRESH: i64 = 50;

pub const MATCH_NOT_FOUND: &str = "매칭 결과를 찾을 수 없습니다.";

// ────────────────────────────────────────────────────────────────────────────
// Response shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ScoreBreakdown {
    pub tech: f64,
    pub experience: f64,
    pub personality: f64,
}

#[derive(Debug, Serialize)]
pub struct AnalysisSummary {
    pub summary: Option<String>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

/// One ranked match joined with its posting, as served to the client.
#[derive(Debug, Serialize)]
pub struct MatchSummary {
    pub match_id: Uuid,
    pub job_id: Uuid,
    pub company: String,
    pub title: String,
    pub position: Option<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub tech_stacks: Vec<String>,
    pub salary: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub match_score: f64,
    pub score_breakdown: ScoreBreakdown,
    pub analysis: AnalysisSummary,
    pub is_bookmarked: bool,
    pub is_applied: bool,
}

#[derive(Debug, Serialize)]
pub struct MatchListResponse {
    pub profile: CandidateProfile,
    pub total: usize,
    pub matches: Vec<MatchSummary>,
}

/// Stored match row joined with the posting columns the response needs.
#[derive(Debug, FromRow)]
struct RankedMatchRow {
    id: Uuid,
    job_posting_id: Uuid,
    match_score: f64,
    analysis: Option<Value>,
    tech_match_score: Option<f64>,
    experience_match_score: Option<f64>,
    personality_match_score: Option<f64>,
    is_bookmarked: bool,
    is_applied: bool,
    company_name: String,
    title: String,
    position: Option<String>,
    location: Option<String>,
    experience_text: Option<String>,
    tech_stacks: Option<Vec<String>>,
    salary_text: Option<String>,
    deadline: Option<NaiveDate>,
}

// ────────────────────────────────────────────────────────────────────────────
// Ranked matches
// ────────────────────────────────────────────────────────────────────────────

/// Ranked matches for a session, computing them on first access or when
/// `refresh` is set.
pub async fn get_matches(
    pool: &PgPool,
    gateway: &dyn InferenceGateway,
    session_id: Uuid,
    refresh: bool,
    limit: i64,
) -> Result<MatchListResponse, AppError> {
    ensure_session(pool, session_id).await?;
    let profile = ensure_profile(pool, gateway, session_id).await?;

    let has_matches: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM job_matches WHERE session_id = $1)")
            .bind(session_id)
            .fetch_one(pool)
            .await?;

    if refresh || !has_matches {
        recompute_matches(pool, gateway, session_id, &profile).await?;
    }

    let rows = sqlx::query_as::<_, RankedMatchRow>(
        r#"
        SELECT jm.id, jm.job_posting_id, jm.match_score, jm.analysis,
               jm.tech_match_score, jm.experience_match_score, jm.personality_match_score,
               jm.is_bookmarked, jm.is_applied,
               jp.company_name, jp.title, jp.position, jp.location, jp.experience_text,
               jp.tech_stacks, jp.salary_text, jp.deadline
        FROM job_matches jm
        JOIN job_postings jp ON jm.job_posting_id = jp.id
        WHERE jm.session_id = $1 AND jp.is_active = TRUE
        ORDER BY jm.match_score DESC
        LIMIT $2
        "#,
    )
    .bind(session_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let matches: Vec<MatchSummary> = rows.into_iter().map(shape_match).collect();

    Ok(MatchListResponse {
        profile,
        total: matches.len(),
        matches,
    })
}

/// Scores the newest active postings and upserts one match row per posting.
/// The upsert column list deliberately excludes the bookmark/applied flags.
async fn recompute_matches(
    pool: &PgPool,
    gateway: &dyn InferenceGateway,
    session_id: Uuid,
    profile: &CandidateProfile,
) -> Result<(), AppError> {
    let postings = sqlx::query_as::<_, JobPostingRow>(
        "SELECT * FROM job_postings WHERE is_active = TRUE ORDER BY posted_at DESC NULLS LAST LIMIT $1",
    )
    .bind(MAX_POSTINGS_PER_REFRESH)
    .fetch_all(pool)
    .await?;

    info!("Scoring {} postings for session {}", postings.len(), session_id);

    // Postings are scored one at a time; no intra-request fan-out.
    for job in &postings {
        let assessment = gateway.score_match(profile, job).await;
        let analysis =
            serde_json::to_value(&assessment.value.analysis).map_err(anyhow::Error::from)?;

        sqlx::query(
            r#"
            INSERT INTO job_matches (
                id, session_id, job_posting_id, match_score, analysis,
                tech_match_score, experience_match_score, personality_match_score,
                location_match_score, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW())
            ON CONFLICT (session_id, job_posting_id) DO UPDATE
            SET match_score = EXCLUDED.match_score,
                analysis = EXCLUDED.analysis,
                tech_match_score = EXCLUDED.tech_match_score,
                experience_match_score = EXCLUDED.experience_match_score,
                personality_match_score = EXCLUDED.personality_match_score,
                location_match_score = EXCLUDED.location_match_score,
                updated_at = NOW()
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(session_id)
        .bind(job.id)
        .bind(assessment.value.match_score)
        .bind(&analysis)
        .bind(assessment.value.tech_match_score)
        .bind(assessment.value.experience_match_score)
        .bind(assessment.value.personality_match_score)
        .bind(assessment.value.location_match_score)
        .execute(pool)
        .await?;
    }

    Ok(())
}

fn shape_match(row: RankedMatchRow) -> MatchSummary {
    let analysis: MatchAnalysis = row
        .analysis
        .map(|v| serde_json::from_value(v).unwrap_or_default())
        .unwrap_or_default();

    MatchSummary {
        match_id: row.id,
        job_id: row.job_posting_id,
        company: row.company_name,
        title: row.title,
        position: row.position,
        location: row.location,
        experience: row.experience_text,
        tech_stacks: row.tech_stacks.unwrap_or_default(),
        salary: row.salary_text,
        deadline: row.deadline,
        match_score: row.match_score,
        score_breakdown: ScoreBreakdown {
            tech: row.tech_match_score.unwrap_or(0.0),
            experience: row.experience_match_score.unwrap_or(0.0),
            personality: row.personality_match_score.unwrap_or(0.0),
        },
        analysis: AnalysisSummary {
            summary: analysis.overall_summary,
            strengths: analysis.strengths,
            improvements: analysis.improvements,
        },
        is_bookmarked: row.is_bookmarked,
        is_applied: row.is_applied,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Bookmark and apply
// ────────────────────────────────────────────────────────────────────────────

/// Flips the bookmark flag, returning the new value.
pub async fn toggle_bookmark(pool: &PgPool, match_id: Uuid) -> Result<bool, AppError> {
    let current: Option<bool> =
        sqlx::query_scalar("SELECT is_bookmarked FROM job_matches WHERE id = $1")
            .bind(match_id)
            .fetch_optional(pool)
            .await?;

    let current = current.ok_or_else(|| AppError::NotFound(MATCH_NOT_FOUND.to_string()))?;

    sqlx::query("UPDATE job_matches SET is_bookmarked = $2, updated_at = NOW() WHERE id = $1")
        .bind(match_id)
        .bind(!current)
        .execute(pool)
        .await?;

    Ok(!current)
}

#[derive(FromRow)]
struct MatchKeyRow {
    session_id: Uuid,
    job_posting_id: Uuid,
}

/// Records an application for the matched posting. The application insert is
/// once-only per (session, posting); the applied flag and `applied_at` are
/// refreshed on every call.
pub async fn apply_to_match(pool: &PgPool, match_id: Uuid) -> Result<(), AppError> {
    let key = sqlx::query_as::<_, MatchKeyRow>(
        "SELECT session_id, job_posting_id FROM job_matches WHERE id = $1",
    )
    .bind(match_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(MATCH_NOT_FOUND.to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO applications (id, session_id, job_posting_id, match_id, status)
        VALUES ($1, $2, $3, $4, 'submitted')
        ON CONFLICT (session_id, job_posting_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(key.session_id)
    .bind(key.job_posting_id)
    .bind(match_id)
    .execute(pool)
    .await?;

    sqlx::query(
        "UPDATE job_matches SET is_applied = TRUE, applied_at = NOW(), updated_at = NOW() WHERE id = $1",
    )
    .bind(match_id)
    .execute(pool)
    .await?;

    info!("Application submitted for match {match_id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ranked_row() -> RankedMatchRow {
        RankedMatchRow {
            id: Uuid::new_v4(),
            job_posting_id: Uuid::new_v4(),
            match_score: 82.5,
            analysis: Some(json!({
                "overall_summary": "기술 스택이 잘 맞습니다",
                "strengths": ["Python 경험"],
                "improvements": ["인프라 경험 보강"]
            })),
            tech_match_score: Some(90.0),
            experience_match_score: None,
            personality_match_score: Some(75.0),
            is_bookmarked: true,
            is_applied: false,
            company_name: "토스".to_string(),
            title: "백엔드 개발자 채용".to_string(),
            position: Some("백엔드".to_string()),
            location: Some("서울".to_string()),
            experience_text: Some("경력 2~5년".to_string()),
            tech_stacks: None,
            salary_text: None,
            deadline: None,
        }
    }

    #[test]
    fn test_shape_match_surfaces_analysis() {
        let shaped = shape_match(ranked_row());
        assert_eq!(
            shaped.analysis.summary.as_deref(),
            Some("기술 스택이 잘 맞습니다")
        );
        assert_eq!(shaped.analysis.strengths, vec!["Python 경험".to_string()]);
        assert_eq!(shaped.match_score, 82.5);
        assert!(shaped.is_bookmarked);
    }

    #[test]
    fn test_shape_match_defaults_missing_subscores() {
        let shaped = shape_match(ranked_row());
        assert_eq!(shaped.score_breakdown.tech, 90.0);
        assert_eq!(shaped.score_breakdown.experience, 0.0);
        assert_eq!(shaped.score_breakdown.personality, 75.0);
    }

    #[test]
    fn test_shape_match_tolerates_null_columns() {
        let mut row = ranked_row();
        row.analysis = None;
        row.tech_stacks = None;
        let shaped = shape_match(row);
        assert!(shaped.analysis.summary.is_none());
        assert!(shaped.analysis.strengths.is_empty());
        assert!(shaped.tech_stacks.is_empty());
    }

    #[test]
    fn test_shape_match_tolerates_malformed_analysis() {
        let mut row = ranked_row();
        row.analysis = Some(json!(["not", "an", "object"]));
        let shaped = shape_match(row);
        assert!(shaped.analysis.summary.is_none());
        assert!(shaped.analysis.strengths.is_empty());
    }

    #[test]
    fn test_shaping_keeps_ranked_order() {
        let mut first = ranked_row();
        first.match_score = 91.0;
        let mut second = ranked_row();
        second.match_score = 64.0;

        let shaped: Vec<MatchSummary> = vec![first, second].into_iter().map(shape_match).collect();
        assert_eq!(shaped[0].match_score, 91.0);
        assert_eq!(shaped[1].match_score, 64.0);
    }
}
