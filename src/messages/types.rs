use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Assistant,
}

/// One entry in the conversation log. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Quick-reply suggestions attached to assistant messages
    pub suggestions: Vec<String>,
    /// Backend-classified intent of the user message this replies to
    pub intent: Option<String>,
    /// Backend-reported certainty for the intent, in [0, 1]
    pub confidence: Option<f64>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            text: text.into(),
            timestamp: Utc::now(),
            suggestions: Vec::new(),
            intent: None,
            confidence: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, text)
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_intent(mut self, intent: impl Into<String>, confidence: Option<f64>) -> Self {
        self.intent = Some(intent.into());
        self.confidence = confidence;
        self
    }

    pub fn is_user(&self) -> bool {
        matches!(self.sender, Sender::User)
    }
}
