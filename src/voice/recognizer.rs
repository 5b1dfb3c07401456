//! Speech recognition seam and the Whisper-backed implementation
//!
//! A recognizer performs exactly one single-utterance recognition per call:
//! it acquires the microphone, waits for speech, endpoints on trailing
//! silence, and returns the transcript.

use crate::Result;
use async_trait::async_trait;
use std::fmt;

/// Failure codes for a recognition attempt, mirroring the error taxonomy
/// of host speech services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionErrorCode {
    /// No speech was detected before the utterance deadline
    NoSpeech,
    /// The caller cancelled the in-flight recognition
    Aborted,
    /// The microphone could not be acquired or failed mid-capture
    AudioCapture,
    /// The host denied access to the microphone
    NotAllowed,
    /// The recognition service could not be reached
    Network,
    /// The recognition engine itself failed
    Engine,
}

impl fmt::Display for RecognitionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            RecognitionErrorCode::NoSpeech => "no-speech",
            RecognitionErrorCode::Aborted => "aborted",
            RecognitionErrorCode::AudioCapture => "audio-capture",
            RecognitionErrorCode::NotAllowed => "not-allowed",
            RecognitionErrorCode::Network => "network",
            RecognitionErrorCode::Engine => "engine",
        };
        f.write_str(code)
    }
}

/// Single-utterance speech recognition.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Listen for one utterance and return its transcript.
    async fn recognize_utterance(&self) -> Result<String>;
}

#[cfg(feature = "stt")]
pub use whisper::WhisperRecognizer;

#[cfg(feature = "stt")]
mod whisper {
    use super::{RecognitionErrorCode, SpeechRecognizer};
    use crate::audio::capture::{CaptureBackend, CaptureStream};
    use crate::audio::resampler::AudioResampler;
    use crate::config::VoiceConfig;
    use crate::{BanklineError, Result};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Instant;
    use tracing::{debug, info, warn};
    use voice_activity_detector::VoiceActivityDetector;
    use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

    /// Whisper operates on 16 kHz mono audio.
    const WHISPER_SAMPLE_RATE: u32 = 16000;

    /// VAD window for 16 kHz input (32 ms).
    const VAD_CHUNK: usize = 512;

    /// Whisper transcription engine
    struct WhisperEngine {
        context: WhisperContext,
        language: Option<String>,
        n_threads: i32,
    }

    impl WhisperEngine {
        fn new(config: &VoiceConfig) -> Result<Self> {
            info!("Loading Whisper model from: {:?}", config.whisper_model);

            if !config.whisper_model.exists() {
                return Err(BanklineError::ModelLoad(format!(
                    "Model file not found: {:?}",
                    config.whisper_model
                )));
            }

            let context = WhisperContext::new_with_params(
                config
                    .whisper_model
                    .to_str()
                    .ok_or_else(|| BanklineError::ModelLoad("Invalid model path".to_string()))?,
                WhisperContextParameters::default(),
            )
            .map_err(|e| {
                BanklineError::ModelLoad(format!("Failed to load Whisper model: {:?}", e))
            })?;

            info!("Whisper model loaded successfully");

            Ok(Self {
                context,
                language: config.language.clone(),
                n_threads: config.n_threads,
            })
        }

        /// Transcribe a finished utterance (16 kHz mono).
        fn transcribe(&self, samples: &[f32]) -> Result<String> {
            let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
            params.set_n_threads(self.n_threads);
            params.set_translate(false);
            params.set_print_timestamps(false);
            params.set_print_special(false);
            params.set_print_progress(false);
            params.set_print_realtime(false);
            if let Some(ref lang) = self.language {
                params.set_language(Some(lang));
            }

            let mut state = self
                .context
                .create_state()
                .map_err(|e| engine_error(format!("Failed to create state: {:?}", e)))?;

            state
                .full(params, samples)
                .map_err(|e| engine_error(format!("Transcription failed: {:?}", e)))?;

            let num_segments = state
                .full_n_segments()
                .map_err(|e| engine_error(format!("Failed to get segments: {:?}", e)))?;

            let mut text = String::new();
            for i in 0..num_segments {
                let segment_text = state
                    .full_get_segment_text(i)
                    .map_err(|e| engine_error(format!("Failed to get segment text: {:?}", e)))?;
                text.push_str(&segment_text);
            }

            debug!("Transcription result: '{}'", text.trim());
            Ok(text.trim().to_string())
        }
    }

    fn engine_error(detail: String) -> BanklineError {
        warn!("Whisper engine error: {}", detail);
        BanklineError::Recognition(RecognitionErrorCode::Engine)
    }

    /// Single-utterance recognition over a microphone capture stream with
    /// VAD endpointing.
    pub struct WhisperRecognizer {
        engine: Arc<WhisperEngine>,
        capture: Arc<dyn CaptureBackend>,
        vad_threshold: f32,
        silence_threshold_secs: f32,
        max_utterance_secs: f32,
    }

    impl WhisperRecognizer {
        pub fn new(config: &VoiceConfig, capture: Arc<dyn CaptureBackend>) -> Result<Self> {
            Ok(Self {
                engine: Arc::new(WhisperEngine::new(config)?),
                capture,
                vad_threshold: config.vad_threshold,
                silence_threshold_secs: config.silence_threshold_secs,
                max_utterance_secs: config.max_utterance_secs,
            })
        }

        /// Accumulate one VAD-endpointed utterance at 16 kHz.
        async fn collect_utterance(&self, stream: &mut Box<dyn CaptureStream>) -> Result<Vec<f32>> {
            let mut vad = VoiceActivityDetector::builder()
                .sample_rate(WHISPER_SAMPLE_RATE as i32)
                .chunk_size(VAD_CHUNK)
                .build()
                .map_err(|e| {
                    warn!("Failed to create VAD: {:?}", e);
                    BanklineError::Recognition(RecognitionErrorCode::Engine)
                })?;

            let source_rate = stream.sample_rate();
            let mut resampler = if source_rate != WHISPER_SAMPLE_RATE {
                Some(AudioResampler::new(source_rate, WHISPER_SAMPLE_RATE)?)
            } else {
                None
            };
            let mut pending: Vec<f32> = Vec::new();
            let mut utterance: Vec<f32> = Vec::new();
            let mut in_speech = false;
            let mut silence_secs = 0f32;
            let window_secs = VAD_CHUNK as f32 / WHISPER_SAMPLE_RATE as f32;
            let started = Instant::now();

            'capture: loop {
                if started.elapsed().as_secs_f32() > self.max_utterance_secs {
                    break 'capture;
                }

                let chunk = match stream.next_chunk().await? {
                    Some(chunk) => chunk,
                    None => break 'capture,
                };

                let chunk = match &mut resampler {
                    Some(resampler) => resampler.resample(&chunk)?,
                    None => chunk,
                };
                pending.extend_from_slice(&chunk);

                while pending.len() >= VAD_CHUNK {
                    let window: Vec<f32> = pending.drain(..VAD_CHUNK).collect();
                    let probability = vad.predict(window.iter().copied());

                    if probability >= self.vad_threshold {
                        in_speech = true;
                        silence_secs = 0.0;
                        utterance.extend_from_slice(&window);
                    } else if in_speech {
                        utterance.extend_from_slice(&window);
                        silence_secs += window_secs;
                        if silence_secs >= self.silence_threshold_secs {
                            break 'capture;
                        }
                    }
                }
            }

            if utterance.is_empty() {
                return Err(BanklineError::Recognition(RecognitionErrorCode::NoSpeech));
            }
            Ok(utterance)
        }
    }

    #[async_trait]
    impl SpeechRecognizer for WhisperRecognizer {
        async fn recognize_utterance(&self) -> Result<String> {
            let mut stream = self.capture.open().await.map_err(|e| {
                warn!("Failed to open capture stream: {}", e);
                BanklineError::Recognition(RecognitionErrorCode::AudioCapture)
            })?;

            let outcome = self.collect_utterance(&mut stream).await;
            stream.close().await;

            let samples = match outcome {
                Ok(samples) => samples,
                Err(e @ BanklineError::Recognition(_)) => return Err(e),
                Err(e) => {
                    warn!("Capture failed mid-utterance: {}", e);
                    return Err(BanklineError::Recognition(RecognitionErrorCode::AudioCapture));
                }
            };

            debug!(
                "Captured utterance: {:.2}s",
                samples.len() as f32 / WHISPER_SAMPLE_RATE as f32
            );

            let engine = Arc::clone(&self.engine);
            let text = tokio::task::spawn_blocking(move || engine.transcribe(&samples))
                .await
                .map_err(|e| engine_error(format!("Transcription task failed: {}", e)))??;

            if text.is_empty() {
                return Err(BanklineError::Recognition(RecognitionErrorCode::NoSpeech));
            }
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_render_like_host_error_names() {
        assert_eq!(RecognitionErrorCode::NoSpeech.to_string(), "no-speech");
        assert_eq!(RecognitionErrorCode::Aborted.to_string(), "aborted");
        assert_eq!(
            RecognitionErrorCode::AudioCapture.to_string(),
            "audio-capture"
        );
    }
}
