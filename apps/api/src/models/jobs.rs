use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A job posting from the read-only catalog. Rows are written by an external
/// collector (see `scripts/seed.sql`); this service only filters and ranks.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPostingRow {
    pub id: Uuid,
    pub source: Option<String>,
    pub external_id: Option<String>,
    pub company_name: String,
    pub title: String,
    pub position: Option<String>,
    pub location: Option<String>,
    pub experience_min: Option<i32>,
    pub experience_max: Option<i32>,
    pub experience_text: Option<String>,
    pub tech_stacks: Option<Vec<String>>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub salary_text: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub preferred_qualifications: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub posted_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Structured analysis attached to a job match, as produced by the remote
/// scorer (or its fallback) and stored in the `analysis` JSONB column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchAnalysis {
    pub overall_summary: Option<String>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}
