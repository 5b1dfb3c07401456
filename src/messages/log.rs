use super::types::Message;
use parking_lot::RwLock;
use std::sync::Arc;

/// Opening assistant message shown before any user input.
pub const GREETING: &str = "Hello! I'm your Banking Virtual Assistant. I can help you with \
account inquiries, transactions, appointments, and financial advice. How can I assist you today?";

/// Starter suggestions attached to the greeting.
pub const GREETING_SUGGESTIONS: [&str; 4] = [
    "Check my account balance",
    "View recent transactions",
    "Book an appointment",
    "Get financial advice",
];

/// Ordered, append-only conversation log shared between the UI thread and
/// the worker pipelines.
#[derive(Debug, Clone)]
pub struct ConversationLog {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// A log seeded with the assistant greeting and starter suggestions.
    pub fn with_greeting() -> Self {
        let log = Self::new();
        log.add(
            Message::assistant(GREETING).with_suggestions(
                GREETING_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            ),
        );
        log
    }

    pub fn add(&self, message: Message) {
        self.messages.write().push(message);
    }

    pub fn get_all(&self) -> Vec<Message> {
        self.messages.read().clone()
    }

    pub fn last(&self) -> Option<Message> {
        self.messages.read().last().cloned()
    }

    pub fn clear(&self) {
        self.messages.write().clear();
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}
