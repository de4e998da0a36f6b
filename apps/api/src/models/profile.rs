//! Candidate profile rows and the typed skills/experiences/preferences blocks.
//!
//! The blocks are stored as JSONB but carry an explicit schema with every
//! field defaulted, so a partial remote payload still parses and a malformed
//! stored value degrades to an empty block on read. Unknown keys survive in
//! the flattened `extra` map rather than being dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateProfileRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub strengths: Option<Vec<String>>,
    pub improvements: Option<Vec<String>>,
    pub skills: Option<Value>,
    pub experiences: Option<Value>,
    pub preferences: Option<Value>,
    pub last_generated_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Normalized profile shape served by the API and fed to match scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub skills: SkillsBlock,
    pub experiences: ExperiencesBlock,
    pub preferences: PreferencesBlock,
    pub last_generated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsBlock {
    pub keywords: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperiencesBlock {
    pub highlights: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesBlock {
    pub roles: Vec<String>,
    pub locations: Vec<String>,
    pub work_style: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
