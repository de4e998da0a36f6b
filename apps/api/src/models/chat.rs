use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatSessionRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub title: String,
    pub status: String,
    /// Mirror of the latest profile summary, written by the materializer.
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessageRow {
    pub id: Uuid,
    pub session_id: Uuid,
    /// `system` | `user` | `assistant`.
    pub role: String,
    pub content: String,
    /// Assistant turns store `{"suggested_topics": [...]}` here. Never exposed
    /// through the API, so it is skipped when serializing.
    #[allow(dead_code)] // carried for the column; only written, never read back
    #[serde(skip_serializing, default)]
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_metadata_is_not_serialized() {
        let row = ChatMessageRow {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            role: "assistant".to_string(),
            content: "안녕하세요!".to_string(),
            metadata: Some(json!({"suggested_topics": ["핵심 기술 스택"]})),
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&row).unwrap();
        assert!(value.get("metadata").is_none());
        assert_eq!(
            value.get("content").and_then(|v| v.as_str()),
            Some("안녕하세요!")
        );
    }
}
