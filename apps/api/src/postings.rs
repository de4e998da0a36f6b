//! Read-only job posting catalog.
//!
//! Postings are written by an external collector; this service only filters
//! and pages them. The filter set mirrors the catalog search the frontend
//! exposes: exact position, substring location, newest first.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};

use crate::errors::AppError;
use crate::models::jobs::JobPostingRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PostingQuery {
    pub position: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_posting_limit")]
    pub limit: i64,
}

fn default_posting_limit() -> i64 {
    20
}

#[derive(Serialize)]
pub struct PostingListResponse {
    pub total: usize,
    pub jobs: Vec<JobPostingRow>,
}

fn build_posting_query(params: &PostingQuery) -> QueryBuilder<'_, Postgres> {
    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT * FROM job_postings WHERE is_active = TRUE");

    if let Some(position) = &params.position {
        qb.push(" AND position = ");
        qb.push_bind(position);
    }

    if let Some(location) = &params.location {
        qb.push(" AND location ILIKE ");
        qb.push_bind(format!("%{location}%"));
    }

    qb.push(" ORDER BY posted_at DESC NULLS LAST LIMIT ");
    qb.push_bind(params.limit);
    qb.push(" OFFSET ");
    qb.push_bind(params.skip);

    qb
}

/// GET /api/job-postings
pub async fn handle_list_postings(
    State(state): State<AppState>,
    Query(params): Query<PostingQuery>,
) -> Result<Json<PostingListResponse>, AppError> {
    let jobs: Vec<JobPostingRow> = build_posting_query(&params)
        .build_query_as()
        .fetch_all(&state.db)
        .await?;

    Ok(Json(PostingListResponse {
        total: jobs.len(),
        jobs,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(position: Option<&str>, location: Option<&str>) -> PostingQuery {
        PostingQuery {
            position: position.map(str::to_string),
            location: location.map(str::to_string),
            skip: 0,
            limit: 20,
        }
    }

    #[test]
    fn test_no_filters_only_pages() {
        let params = params(None, None);
        let qb = build_posting_query(&params);
        let sql = qb.sql();
        assert!(sql.starts_with("SELECT * FROM job_postings WHERE is_active = TRUE"));
        assert!(!sql.contains("position"));
        assert!(!sql.contains("ILIKE"));
        assert!(sql.contains("ORDER BY posted_at DESC NULLS LAST LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn test_position_filter_is_exact_match() {
        let params = params(Some("백엔드"), None);
        let qb = build_posting_query(&params);
        assert!(qb.sql().contains("AND position = $1"));
    }

    #[test]
    fn test_location_filter_is_substring_match() {
        let params = params(None, Some("서울"));
        let qb = build_posting_query(&params);
        assert!(qb.sql().contains("AND location ILIKE $1"));
    }

    #[test]
    fn test_both_filters_bind_in_order() {
        let params = params(Some("백엔드"), Some("판교"));
        let qb = build_posting_query(&params);
        let sql = qb.sql().to_string();
        assert!(sql.contains("position = $1"));
        assert!(sql.contains("location ILIKE $2"));
        assert!(sql.contains("LIMIT $3 OFFSET $4"));
    }
}
