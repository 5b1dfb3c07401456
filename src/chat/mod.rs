pub mod client;
pub mod context;
pub mod pipeline;
pub mod types;

pub use client::ChatClient;
pub use context::SessionContext;
pub use pipeline::{ChatCommand, ChatEvent, ChatPipeline};
pub use types::{ChatReply, ChatRequest, IntentInfo, KnowledgeBaseArticle};
