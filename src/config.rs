//! Application configuration
//!
//! Loaded once at startup from a JSON file (`bankline.json` or the path in
//! `BANKLINE_CONFIG`), with defaults that point at a local backend.

use crate::{BanklineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote backend endpoints and timeouts
    pub backend: BackendConfig,

    /// Voice engine settings
    pub voice: VoiceConfig,

    /// User identifier attached to every outbound call
    pub user_id: String,

    /// Speak assistant replies out loud when synthesis is available
    pub speak_replies: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            voice: VoiceConfig::default(),
            user_id: "demo_user".to_string(),
            speak_replies: true,
        }
    }
}

/// Remote backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the banking assistant API, e.g. `http://localhost:8080/api`
    pub base_url: String,

    /// Timeout for text chat requests, in seconds
    pub chat_timeout_secs: u64,

    /// Timeout for voice upload requests, in seconds
    pub voice_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            chat_timeout_secs: 10,
            voice_timeout_secs: 15,
        }
    }
}

/// Voice engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Path to the Whisper model file
    pub whisper_model: PathBuf,

    /// Language to transcribe (None for auto-detection)
    pub language: Option<String>,

    /// Number of threads to use for transcription
    pub n_threads: i32,

    /// Speech probability threshold for the endpointing VAD (0.0-1.0)
    pub vad_threshold: f32,

    /// Trailing silence that ends an utterance, in seconds
    pub silence_threshold_secs: f32,

    /// Hard cap on a single utterance, in seconds
    pub max_utterance_secs: f32,

    /// Duration of a microphone clip recorded for server-side
    /// transcription, in milliseconds
    pub record_duration_ms: u64,

    /// Path to the VITS TTS model file
    pub tts_model: String,

    /// Path to the VITS tokens file
    pub tts_tokens: String,

    /// Path to the VITS lexicon file (optional for some models)
    pub tts_lexicon: Option<String>,

    /// Path to the VITS data directory (optional)
    pub tts_data_dir: Option<String>,

    /// Speaker ID for multi-speaker VITS models
    pub tts_speaker_id: i32,

    /// Speech rate multiplier (1.0 = normal)
    pub tts_speed: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            whisper_model: PathBuf::from("models/ggml-base.en.bin"),
            language: Some("en".to_string()),
            n_threads: 4,
            vad_threshold: 0.5,
            silence_threshold_secs: 0.8,
            max_utterance_secs: 30.0,
            record_duration_ms: 5000,
            tts_model: String::new(),
            tts_tokens: String::new(),
            tts_lexicon: None,
            tts_data_dir: None,
            tts_speaker_id: 0,
            tts_speed: 0.9,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&raw)
            .map_err(|e| BanklineError::Config(format!("invalid config file: {}", e)))
    }

    /// Load `BANKLINE_CONFIG` or `./bankline.json` if present, otherwise
    /// fall back to defaults. A malformed file is reported and skipped.
    pub fn load_or_default() -> Self {
        let path = std::env::var("BANKLINE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("bankline.json"));

        if !path.exists() {
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", path);
                config
            }
            Err(e) => {
                warn!("Ignoring config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}

impl BackendConfig {
    pub fn chat_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.chat_timeout_secs)
    }

    pub fn voice_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.voice_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_point_at_local_backend() {
        let config = AppConfig::default();
        assert_eq!(config.backend.base_url, "http://localhost:8080/api");
        assert_eq!(config.backend.chat_timeout_secs, 10);
        assert_eq!(config.backend.voice_timeout_secs, 15);
        assert_eq!(config.user_id, "demo_user");
        assert_eq!(config.voice.record_duration_ms, 5000);
    }

    #[test]
    fn load_accepts_partial_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"backend": {{"base_url": "https://bank.example/api"}}, "user_id": "alice"}}"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.backend.base_url, "https://bank.example/api");
        // omitted fields keep their defaults
        assert_eq!(config.backend.chat_timeout_secs, 10);
        assert_eq!(config.user_id, "alice");
    }

    #[test]
    fn load_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(BanklineError::Config(_))
        ));
    }
}
