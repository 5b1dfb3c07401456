pub mod log;
pub mod types;

pub use log::ConversationLog;
pub use types::{Message, Sender};
