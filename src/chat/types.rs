//! Client-side shapes of the chatbot API
//!
//! The backend owns these contracts; field names follow its camelCase
//! JSON.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Body of `POST /chatbot/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub session_id: String,
    pub user_id: String,
}

impl ChatRequest {
    pub fn text(message: impl Into<String>, session: &crate::chat::SessionContext) -> Self {
        Self {
            message: message.into(),
            message_type: "text".to_string(),
            session_id: session.session_id.clone(),
            user_id: session.user_id.clone(),
        }
    }
}

/// Response of the chat and voice endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub message: String,
    pub intent: Option<String>,
    pub confidence: Option<f64>,
    /// Backend local time without offset
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// Base64 audio the backend may attach to voice replies
    #[serde(default)]
    pub audio_response: Option<String>,
    #[serde(default)]
    pub requires_action: bool,
    #[serde(default)]
    pub action_type: Option<String>,
    #[serde(default)]
    pub action_data: Option<serde_json::Value>,
}

/// One entry of `GET /chatbot/intents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentInfo {
    pub name: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub entities: Option<serde_json::Value>,
}

/// One result of `GET /chatbot/knowledge-base`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBaseArticle {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub relevance_score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::SessionContext;

    #[test]
    fn request_serializes_with_backend_field_names() {
        let session = SessionContext::new("demo_user");
        let request = ChatRequest::text("Check my account balance", &session);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["message"], "Check my account balance");
        assert_eq!(json["type"], "text");
        assert_eq!(json["sessionId"], session.session_id);
        assert_eq!(json["userId"], "demo_user");
    }

    #[test]
    fn reply_deserializes_backend_json() {
        let json = r#"{
            "message": "Your current balance is £2,450.30.",
            "intent": "account_balance",
            "confidence": 0.95,
            "timestamp": "2025-03-14T09:26:53",
            "suggestions": ["View transactions", "Transfer money"],
            "requiresAction": false
        }"#;

        let reply: ChatReply = serde_json::from_str(json).unwrap();
        assert_eq!(reply.intent.as_deref(), Some("account_balance"));
        assert_eq!(reply.confidence, Some(0.95));
        assert_eq!(reply.suggestions.len(), 2);
        assert!(!reply.requires_action);
        assert!(reply.timestamp.is_some());
        assert!(reply.audio_response.is_none());
    }

    #[test]
    fn reply_tolerates_minimal_json() {
        let reply: ChatReply = serde_json::from_str(r#"{"message": "Hello"}"#).unwrap();
        assert_eq!(reply.message, "Hello");
        assert!(reply.suggestions.is_empty());
        assert!(reply.intent.is_none());
    }

    #[test]
    fn knowledge_base_article_deserializes() {
        let json = r#"{
            "id": "kb-7",
            "title": "Overdraft fees",
            "content": "Overdraft fees apply when...",
            "category": "fees",
            "relevanceScore": 0.82
        }"#;
        let article: KnowledgeBaseArticle = serde_json::from_str(json).unwrap();
        assert_eq!(article.relevance_score, Some(0.82));
    }
}
