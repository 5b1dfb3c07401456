//! Speech synthesis seam and the VITS-backed implementation
//!
//! An utterance in progress can be cancelled by a newer one through its
//! [`CancelFlag`]; implementations check the flag between synthesis and
//! playback and while the output buffer drains.

use crate::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag for one synthesis utterance.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Text-to-speech playback.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize and play `text`. `voice` selects an engine-specific
    /// voice; `None` uses the default. Returns once playback finishes or
    /// `cancel` fires.
    async fn speak(&self, text: &str, voice: Option<&str>, cancel: CancelFlag) -> Result<()>;
}

#[cfg(feature = "tts")]
pub use vits::VitsSynthesizer;

#[cfg(feature = "tts")]
mod vits {
    use super::{CancelFlag, SpeechSynthesizer};
    use crate::audio::output::{output_sample_rate, play_blocking};
    use crate::audio::resampler::resample_audio;
    use crate::config::VoiceConfig;
    use crate::{BanklineError, Result};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use sherpa_rs::tts::{VitsTts, VitsTtsConfig};
    use std::path::Path;
    use std::sync::Arc;
    use tracing::info;

    /// VITS neural TTS over sherpa-rs, played through the default output
    /// device.
    pub struct VitsSynthesizer {
        engine: Arc<Mutex<VitsTts>>,
        default_speaker: i32,
        speed: f32,
        output_rate: u32,
    }

    impl VitsSynthesizer {
        pub fn new(config: &VoiceConfig) -> Result<Self> {
            if config.tts_model.is_empty() {
                return Err(BanklineError::Config("TTS model path is required".into()));
            }
            if config.tts_tokens.is_empty() {
                return Err(BanklineError::Config("TTS tokens path is required".into()));
            }
            if !Path::new(&config.tts_model).exists() {
                return Err(BanklineError::ModelLoad(format!(
                    "Model not found: {}",
                    config.tts_model
                )));
            }
            if !Path::new(&config.tts_tokens).exists() {
                return Err(BanklineError::ModelLoad(format!(
                    "Tokens file not found: {}",
                    config.tts_tokens
                )));
            }

            info!("Loading VITS TTS model from: {}", config.tts_model);

            let vits_config = VitsTtsConfig {
                model: config.tts_model.clone(),
                tokens: config.tts_tokens.clone(),
                lexicon: config.tts_lexicon.clone().unwrap_or_default(),
                data_dir: config.tts_data_dir.clone().unwrap_or_default(),
                // length scale is the inverse of speech rate
                length_scale: 1.0 / config.tts_speed.max(0.1),
                ..Default::default()
            };

            let engine = VitsTts::new(vits_config);
            let output_rate = output_sample_rate()?;

            info!("TTS engine initialized successfully");

            Ok(Self {
                engine: Arc::new(Mutex::new(engine)),
                default_speaker: config.tts_speaker_id,
                speed: config.tts_speed,
                output_rate,
            })
        }

    }

    #[async_trait]
    impl SpeechSynthesizer for VitsSynthesizer {
        async fn speak(&self, text: &str, voice: Option<&str>, cancel: CancelFlag) -> Result<()> {
            let text = text.trim().to_string();
            if text.is_empty() {
                return Ok(());
            }

            // A voice selector names a speaker in a multi-speaker model
            let speaker = voice
                .and_then(|v| v.parse::<i32>().ok())
                .unwrap_or(self.default_speaker);

            let engine = Arc::clone(&self.engine);
            let speed = self.speed;
            let output_rate = self.output_rate;
            let playback_cancel = cancel.clone();

            tokio::task::spawn_blocking(move || {
                let audio = engine
                    .lock()
                    .create(&text, speaker, speed)
                    .map_err(|e| BanklineError::Synthesis(format!("Synthesis failed: {}", e)))?;

                if playback_cancel.is_cancelled() {
                    return Ok(());
                }

                let samples =
                    resample_audio(&audio.samples, audio.sample_rate as u32, output_rate)?;
                play_blocking(&samples, &playback_cancel)
            })
            .await
            .map_err(|e| BanklineError::Synthesis(format!("Synthesis task failed: {}", e)))?
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn missing_model_is_rejected() {
            let config = VoiceConfig {
                tts_model: "/nonexistent/model.onnx".into(),
                tts_tokens: "/nonexistent/tokens.txt".into(),
                ..VoiceConfig::default()
            };
            assert!(VitsSynthesizer::new(&config).is_err());
        }
    }
}
