pub mod audio;
pub mod capability;
pub mod chat;
pub mod config;
pub mod dashboard;
pub mod messages;
pub mod ui;
pub mod voice;

use thiserror::Error;

pub use voice::recognizer::RecognitionErrorCode;

#[derive(Error, Debug, Clone)]
pub enum BanklineError {
    #[error("Capability not supported: {0}")]
    UnsupportedCapability(String),

    #[error("A listening operation is already in flight")]
    AlreadyListening,

    #[error("Speech recognition error: {0}")]
    Recognition(RecognitionErrorCode),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("Audio processing error: {0}")]
    AudioProcessing(String),

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("Model load error: {0}")]
    ModelLoad(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for BanklineError {
    fn from(e: std::io::Error) -> Self {
        BanklineError::Io(e.to_string())
    }
}

impl BanklineError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // The user can always retry with text input
            BanklineError::UnsupportedCapability(_) => true,
            BanklineError::AlreadyListening => true,
            BanklineError::Recognition(_) => true,
            // Transient backend conditions
            BanklineError::Network(_) => true,
            BanklineError::Timeout(_) => true,
            BanklineError::Synthesis(_) => true,
            BanklineError::AudioProcessing(_) => true,
            // Hardware/device errors may require user intervention
            BanklineError::AudioDevice(_) => false,
            // Model errors require restarting with fixed paths
            BanklineError::ModelLoad(_) => false,
            BanklineError::Config(_) => false,
            BanklineError::Channel(_) => false,
            BanklineError::Io(_) => false,
        }
    }

    /// Get a user-friendly description for the inline error banner
    pub fn user_message(&self) -> String {
        match self {
            BanklineError::UnsupportedCapability(_) => {
                "Voice features are not supported on this device. Please type instead.".to_string()
            }
            BanklineError::AlreadyListening => {
                "Already listening. Please finish speaking first.".to_string()
            }
            BanklineError::Recognition(_) => {
                "Voice input failed. Please try typing instead.".to_string()
            }
            BanklineError::Network(_) | BanklineError::Timeout(_) => {
                "Sorry, I encountered an error. Please try again.".to_string()
            }
            BanklineError::AudioDevice(_) => {
                "Audio device error. Please check your microphone/speakers.".to_string()
            }
            BanklineError::AudioProcessing(_) => {
                "Audio processing failed. Please try again.".to_string()
            }
            BanklineError::Synthesis(_) => {
                "Text-to-speech failed. Response will be shown as text.".to_string()
            }
            BanklineError::ModelLoad(_) => {
                "Failed to load speech model. Please verify model files are present.".to_string()
            }
            BanklineError::Config(_) => "Configuration error. Please check settings.".to_string(),
            BanklineError::Channel(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            BanklineError::Io(_) => "File system error occurred.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BanklineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_errors_are_recoverable() {
        assert!(BanklineError::Network("connection refused".into()).is_recoverable());
        assert!(BanklineError::Timeout(10).is_recoverable());
        assert!(!BanklineError::AudioDevice("no input device".into()).is_recoverable());
    }

    #[test]
    fn user_messages_never_leak_internals() {
        let err = BanklineError::Network("tcp connect error: 127.0.0.1:9".into());
        assert!(!err.user_message().contains("127.0.0.1"));
    }
}
