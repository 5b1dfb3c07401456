pub mod pipeline;
pub mod recognizer;
pub mod session;
pub mod synthesizer;

pub use pipeline::{VoiceCommand, VoiceEvent, VoicePipeline};
pub use session::{ListenState, VoiceSession};

use crate::capability::Capabilities;
use crate::config::VoiceConfig;

/// Assemble a [`VoiceSession`] from the compiled-in engines, honoring the
/// startup capability descriptor. An engine that fails to initialize
/// downgrades its capability bit instead of aborting startup.
pub fn build_session(config: &VoiceConfig, capabilities: Capabilities) -> VoiceSession {
    let mut capabilities = capabilities;

    let capture = build_capture(&mut capabilities);
    let recognizer = build_recognizer(config, capture.clone(), &mut capabilities);
    let synthesizer = build_synthesizer(config, &mut capabilities);

    VoiceSession::new(capabilities, recognizer, synthesizer, capture)
}

#[cfg(feature = "audio-io")]
fn build_capture(
    capabilities: &mut Capabilities,
) -> Option<std::sync::Arc<dyn crate::audio::CaptureBackend>> {
    if !capabilities.capture {
        return None;
    }
    Some(std::sync::Arc::new(crate::audio::CpalCapture::new()))
}

#[cfg(not(feature = "audio-io"))]
fn build_capture(
    capabilities: &mut Capabilities,
) -> Option<std::sync::Arc<dyn crate::audio::CaptureBackend>> {
    capabilities.capture = false;
    None
}

#[cfg(feature = "stt")]
fn build_recognizer(
    config: &VoiceConfig,
    capture: Option<std::sync::Arc<dyn crate::audio::CaptureBackend>>,
    capabilities: &mut Capabilities,
) -> Option<std::sync::Arc<dyn recognizer::SpeechRecognizer>> {
    if !capabilities.recognition {
        return None;
    }
    let capture = match capture {
        Some(capture) => capture,
        None => {
            capabilities.recognition = false;
            return None;
        }
    };
    match recognizer::WhisperRecognizer::new(config, capture) {
        Ok(recognizer) => Some(std::sync::Arc::new(recognizer)),
        Err(e) => {
            tracing::warn!("Speech recognition disabled: {}", e);
            capabilities.recognition = false;
            None
        }
    }
}

#[cfg(not(feature = "stt"))]
fn build_recognizer(
    _config: &VoiceConfig,
    _capture: Option<std::sync::Arc<dyn crate::audio::CaptureBackend>>,
    capabilities: &mut Capabilities,
) -> Option<std::sync::Arc<dyn recognizer::SpeechRecognizer>> {
    capabilities.recognition = false;
    None
}

#[cfg(feature = "tts")]
fn build_synthesizer(
    config: &VoiceConfig,
    capabilities: &mut Capabilities,
) -> Option<std::sync::Arc<dyn synthesizer::SpeechSynthesizer>> {
    if !capabilities.synthesis {
        return None;
    }
    match synthesizer::VitsSynthesizer::new(config) {
        Ok(synth) => Some(std::sync::Arc::new(synth)),
        Err(e) => {
            tracing::warn!("Speech synthesis disabled: {}", e);
            capabilities.synthesis = false;
            None
        }
    }
}

#[cfg(not(feature = "tts"))]
fn build_synthesizer(
    _config: &VoiceConfig,
    capabilities: &mut Capabilities,
) -> Option<std::sync::Arc<dyn synthesizer::SpeechSynthesizer>> {
    capabilities.synthesis = false;
    None
}
