//! Deterministic local substitutes for the remote inference service.
//!
//! These are returned whenever the remote call fails in any way, so every
//! template here is part of the user-visible contract: exact strings,
//! thresholds, and keyword priorities are load-bearing.

use crate::inference::types::{AssistantReply, ChatTurn, ExtractedProfile, MatchAssessment};
use crate::models::jobs::MatchAnalysis;

/// Acknowledgement phrasing switches once the latest user message reaches
/// this many characters (code points, not bytes).
const DETAILED_MESSAGE_CHARS: usize = 120;

/// Profile summaries are cut to this many characters before the ellipsis.
const SUMMARY_MAX_CHARS: usize = 280;

const DEFAULT_GREETING: &str = "안녕하세요!";
const ACK_RECEIVED: &str = "알려주셔서 감사합니다.";
const ACK_DETAILED: &str = "정말 자세한 설명이네요!";
const FOLLOW_UP: &str = "다음으로 강조하고 싶은 경험이나 프로젝트가 있나요?";

const SUGGESTED_TOPICS: [&str; 3] = ["핵심 기술 스택", "주요 성과", "관심 있는 산업/기업 문화"];

const DEFAULT_HEADLINE: &str = "열정적인 지원자";
const EMPTY_SUMMARY: &str = "아직 정보가 충분하지 않습니다.";

/// Templated acknowledgement of the latest user turn plus a fixed follow-up
/// question and suggested topics.
pub fn reply(history: &[ChatTurn]) -> AssistantReply {
    let last_user_message = history
        .iter()
        .rev()
        .find(|turn| turn.role == "user")
        .map(|turn| turn.content.as_str())
        .unwrap_or(DEFAULT_GREETING);

    let acknowledgement = if last_user_message.chars().count() < DETAILED_MESSAGE_CHARS {
        ACK_RECEIVED
    } else {
        ACK_DETAILED
    };

    AssistantReply {
        content: format!("{acknowledgement} 말씀해 주신 내용을 정리해 보고 있어요. {FOLLOW_UP}"),
        suggested_topics: SUGGESTED_TOPICS.iter().map(|s| s.to_string()).collect(),
    }
}

/// Keyword-matched profile over the accumulated user text. Headline keywords
/// are checked in priority order: design, backend/server, data.
pub fn profile(history: &[ChatTurn]) -> ExtractedProfile {
    let combined = history
        .iter()
        .filter(|turn| turn.role == "user")
        .map(|turn| turn.content.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();

    let headline = if combined.contains("디자") {
        "크리에이티브 디자이너"
    } else if combined.contains("백엔드") || combined.contains("서버") {
        "백엔드 개발자"
    } else if combined.contains("데이터") {
        "데이터 분석가"
    } else {
        DEFAULT_HEADLINE
    };

    let summary = if combined.is_empty() {
        EMPTY_SUMMARY.to_string()
    } else if combined.chars().count() > SUMMARY_MAX_CHARS {
        let truncated: String = combined.chars().take(SUMMARY_MAX_CHARS).collect();
        format!("{truncated}...")
    } else {
        combined.clone()
    };

    let mut strengths = vec![
        "학습 의지가 뛰어남".to_string(),
        "팀 커뮤니케이션 능력".to_string(),
    ];
    if !combined.is_empty() {
        strengths.push("실제 대화를 기반으로 요약".to_string());
    }

    ExtractedProfile {
        headline: Some(headline.to_string()),
        summary: Some(summary),
        strengths,
        improvements: vec![
            "구체적인 수치 기반 성과를 더 공유".to_string(),
            "희망 근무 형태를 명확히 전달".to_string(),
        ],
        ..ExtractedProfile::default()
    }
}

/// Fixed 70-point assessment with a placeholder analysis. The location
/// sub-score is intentionally left unset.
pub fn assessment() -> MatchAssessment {
    MatchAssessment {
        match_score: 70.0,
        tech_match_score: Some(70.0),
        experience_match_score: Some(70.0),
        personality_match_score: Some(70.0),
        location_match_score: None,
        analysis: MatchAnalysis {
            overall_summary: Some("AI 서버 대기 중".to_string()),
            strengths: vec!["기술 스택 분석 중".to_string(), "경력 분석 중".to_string()],
            improvements: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: &str, content: &str) -> ChatTurn {
        ChatTurn {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_short_message_gets_received_phrasing() {
        let history = [turn("user", "저는 개발자입니다")];
        let reply = reply(&history);
        assert!(reply.content.starts_with(ACK_RECEIVED));
        assert!(reply.content.ends_with(FOLLOW_UP));
    }

    #[test]
    fn test_long_message_gets_detailed_phrasing() {
        let history = [turn("user", &"가".repeat(120))];
        let reply = reply(&history);
        assert!(reply.content.starts_with(ACK_DETAILED));
    }

    #[test]
    fn test_threshold_counts_chars_not_bytes() {
        // 119 Korean chars are 357 bytes; still below the 120-char threshold.
        let history = [turn("user", &"가".repeat(119))];
        let reply = reply(&history);
        assert!(reply.content.starts_with(ACK_RECEIVED));
    }

    #[test]
    fn test_reply_uses_latest_user_turn() {
        let history = [
            turn("user", "짧은 메시지"),
            turn("assistant", "네"),
            turn("user", &"상".repeat(200)),
        ];
        let reply = reply(&history);
        assert!(reply.content.starts_with(ACK_DETAILED));
    }

    #[test]
    fn test_reply_without_user_turn_uses_greeting() {
        let history = [turn("system", "코치 프롬프트")];
        let reply = reply(&history);
        assert!(reply.content.starts_with(ACK_RECEIVED));
        assert_eq!(reply.suggested_topics.len(), 3);
        assert_eq!(reply.suggested_topics[0], "핵심 기술 스택");
    }

    #[test]
    fn test_backend_keyword_headline() {
        let history = [turn("user", "저는 백엔드 개발자입니다")];
        assert_eq!(profile(&history).headline.as_deref(), Some("백엔드 개발자"));
    }

    #[test]
    fn test_server_keyword_maps_to_backend_headline() {
        let history = [turn("user", "서버 운영 경험이 있습니다")];
        assert_eq!(profile(&history).headline.as_deref(), Some("백엔드 개발자"));
    }

    #[test]
    fn test_design_keyword_outranks_backend() {
        let history = [turn("user", "디자인과 백엔드를 모두 해봤어요")];
        assert_eq!(
            profile(&history).headline.as_deref(),
            Some("크리에이티브 디자이너")
        );
    }

    #[test]
    fn test_data_keyword_headline() {
        let history = [turn("user", "데이터 분석 프로젝트를 했습니다")];
        assert_eq!(profile(&history).headline.as_deref(), Some("데이터 분석가"));
    }

    #[test]
    fn test_no_keyword_gives_default_headline() {
        let history = [turn("user", "안녕하세요")];
        assert_eq!(profile(&history).headline.as_deref(), Some(DEFAULT_HEADLINE));
    }

    #[test]
    fn test_summary_truncated_at_280_chars() {
        let history = [turn("user", &"가".repeat(281))];
        let summary = profile(&history).summary.unwrap();
        assert!(summary.ends_with("..."));
        assert_eq!(summary.chars().count(), SUMMARY_MAX_CHARS + 3);
    }

    #[test]
    fn test_short_summary_kept_verbatim() {
        let history = [turn("user", "백엔드 3년")];
        assert_eq!(profile(&history).summary.as_deref(), Some("백엔드 3년"));
    }

    #[test]
    fn test_empty_history_summary_placeholder() {
        let profile = profile(&[]);
        assert_eq!(profile.summary.as_deref(), Some(EMPTY_SUMMARY));
        assert_eq!(profile.strengths.len(), 2);
    }

    #[test]
    fn test_user_text_adds_third_strength() {
        let history = [turn("user", "안녕하세요")];
        let profile = profile(&history);
        assert_eq!(profile.strengths.len(), 3);
        assert_eq!(profile.strengths[2], "실제 대화를 기반으로 요약");
    }

    #[test]
    fn test_user_turns_joined_across_messages() {
        // The keyword may only appear once all user turns are concatenated.
        let history = [
            turn("user", "저는 개발을"),
            turn("assistant", "네, 말씀해 주세요"),
            turn("user", "데이터 쪽에서 했습니다"),
        ];
        assert_eq!(profile(&history).headline.as_deref(), Some("데이터 분석가"));
    }

    #[test]
    fn test_fallback_profile_is_never_empty() {
        assert!(!profile(&[]).is_empty());
    }

    #[test]
    fn test_assessment_is_fixed_seventy() {
        let assessment = assessment();
        assert_eq!(assessment.match_score, 70.0);
        assert_eq!(assessment.tech_match_score, Some(70.0));
        assert_eq!(assessment.experience_match_score, Some(70.0));
        assert_eq!(assessment.personality_match_score, Some(70.0));
        assert!(assessment.location_match_score.is_none());
        assert_eq!(assessment.analysis.overall_summary.as_deref(), Some("AI 서버 대기 중"));
        assert_eq!(assessment.analysis.strengths.len(), 2);
        assert!(assessment.analysis.improvements.is_empty());
    }
}
