//! Wire schema for the remote inference service.
//!
//! Every field is defaulted or optional: a 200 response that still fails to
//! fit this schema is treated like any other gateway failure and replaced by
//! the local fallback, instead of half-parsed data leaking into storage.

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use crate::models::jobs::MatchAnalysis;
use crate::models::profile::{CandidateProfile, ExperiencesBlock, PreferencesBlock, SkillsBlock};

/// One turn of conversation history, as sent to the remote service.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// Assistant reply returned by `POST {base}/api/chat/reply`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssistantReply {
    pub content: String,
    #[serde(default)]
    pub suggested_topics: Vec<String>,
}

/// Candidate profile returned by `POST {base}/api/profile/extract`.
///
/// `strengths`/`improvements` accept either a JSON list or a bare string;
/// the bare string is wrapped into a singleton list at deserialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractedProfile {
    pub headline: Option<String>,
    pub summary: Option<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub strengths: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub improvements: Vec<String>,
    pub skills: SkillsBlock,
    pub experiences: ExperiencesBlock,
    pub preferences: PreferencesBlock,
}

impl ExtractedProfile {
    /// True when the remote service answered with `{}` (or nothing useful):
    /// such an extraction must not overwrite a stored profile.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A fresh extraction seen as a profile. `last_generated_at` stays unset
/// until the row is written; re-reads carry the database timestamp.
impl From<ExtractedProfile> for CandidateProfile {
    fn from(extracted: ExtractedProfile) -> Self {
        CandidateProfile {
            headline: extracted.headline,
            summary: extracted.summary,
            strengths: extracted.strengths,
            improvements: extracted.improvements,
            skills: extracted.skills,
            experiences: extracted.experiences,
            preferences: extracted.preferences,
            last_generated_at: None,
        }
    }
}

/// Match assessment returned by `POST {base}/api/match`.
///
/// The location sub-score is modeled but never produced by the fallback.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatchAssessment {
    pub match_score: f64,
    pub tech_match_score: Option<f64>,
    pub experience_match_score: Option<f64>,
    pub personality_match_score: Option<f64>,
    pub location_match_score: Option<f64>,
    pub analysis: MatchAnalysis,
}

/// Accepts a list of strings, a single bare string, null, or a missing field.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_string_strengths_become_singleton_list() {
        let profile: ExtractedProfile =
            serde_json::from_str(r#"{"headline": "x", "strengths": "only one"}"#).unwrap();
        assert_eq!(profile.strengths, vec!["only one".to_string()]);
    }

    #[test]
    fn test_list_strengths_pass_through() {
        let profile: ExtractedProfile =
            serde_json::from_str(r#"{"strengths": ["a", "b"]}"#).unwrap();
        assert_eq!(profile.strengths, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_null_and_missing_lists_are_empty() {
        let profile: ExtractedProfile =
            serde_json::from_str(r#"{"strengths": null}"#).unwrap();
        assert!(profile.strengths.is_empty());
        assert!(profile.improvements.is_empty());
    }

    #[test]
    fn test_empty_object_is_empty_profile() {
        let profile: ExtractedProfile = serde_json::from_str("{}").unwrap();
        assert!(profile.is_empty());
    }

    #[test]
    fn test_any_field_makes_profile_non_empty() {
        let profile: ExtractedProfile =
            serde_json::from_str(r#"{"summary": "서버 개발 3년"}"#).unwrap();
        assert!(!profile.is_empty());
    }

    #[test]
    fn test_unknown_block_keys_are_preserved() {
        let profile: ExtractedProfile = serde_json::from_str(
            r#"{"skills": {"keywords": ["Rust"], "proficiency": "expert"}}"#,
        )
        .unwrap();
        assert_eq!(profile.skills.keywords, vec!["Rust".to_string()]);
        assert_eq!(
            profile.skills.extra.get("proficiency").and_then(|v| v.as_str()),
            Some("expert")
        );
    }

    #[test]
    fn test_assessment_defaults_missing_scores() {
        let assessment: MatchAssessment =
            serde_json::from_str(r#"{"match_score": 88.5}"#).unwrap();
        assert_eq!(assessment.match_score, 88.5);
        assert!(assessment.tech_match_score.is_none());
        assert_eq!(assessment.analysis, MatchAnalysis::default());
    }

    #[test]
    fn test_assessment_missing_overall_score_is_zero() {
        let assessment: MatchAssessment =
            serde_json::from_str(r#"{"tech_match_score": 50.0}"#).unwrap();
        assert_eq!(assessment.match_score, 0.0);
        assert_eq!(assessment.tech_match_score, Some(50.0));
    }
}
