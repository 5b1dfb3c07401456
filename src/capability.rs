//! Capability detection for the host's speech and audio subsystems
//!
//! Probed once at startup and passed to the components that need it, so
//! nothing downstream has to guess which engines are usable.

use crate::config::VoiceConfig;
use tracing::info;

/// Which voice features the running host supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// A speech-recognition engine is compiled in and usable
    pub recognition: bool,
    /// A speech-synthesis engine is compiled in and usable
    pub synthesis: bool,
    /// A microphone capture device is present
    pub capture: bool,
}

impl Capabilities {
    /// Probe the host once. Capture requires an input device; recognition
    /// and synthesis additionally require their engine feature and model
    /// files.
    pub fn detect(voice: &VoiceConfig) -> Self {
        let capture = input_device_present();

        let recognition = cfg!(feature = "stt") && capture && voice.whisper_model.exists();

        let synthesis = cfg!(feature = "tts")
            && output_device_present()
            && !voice.tts_model.is_empty()
            && std::path::Path::new(&voice.tts_model).exists()
            && std::path::Path::new(&voice.tts_tokens).exists();

        let caps = Self {
            recognition,
            synthesis,
            capture,
        };

        info!(
            recognition = caps.recognition,
            synthesis = caps.synthesis,
            capture = caps.capture,
            "Probed voice capabilities"
        );

        caps
    }

    /// A descriptor with everything disabled (text-only operation).
    pub fn none() -> Self {
        Self::default()
    }

    /// True if any voice input path is available.
    pub fn voice_input(&self) -> bool {
        self.recognition || self.capture
    }
}

#[cfg(feature = "audio-io")]
fn input_device_present() -> bool {
    use cpal::traits::HostTrait;
    cpal::default_host().default_input_device().is_some()
}

#[cfg(not(feature = "audio-io"))]
fn input_device_present() -> bool {
    false
}

#[cfg(feature = "audio-io")]
fn output_device_present() -> bool {
    use cpal::traits::HostTrait;
    cpal::default_host().default_output_device().is_some()
}

#[cfg(not(feature = "audio-io"))]
fn output_device_present() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_disables_everything() {
        let caps = Capabilities::none();
        assert!(!caps.recognition);
        assert!(!caps.synthesis);
        assert!(!caps.capture);
        assert!(!caps.voice_input());
    }

    #[test]
    fn detect_without_models_disables_engines() {
        let voice = VoiceConfig {
            whisper_model: "/nonexistent/model.bin".into(),
            tts_model: String::new(),
            ..VoiceConfig::default()
        };
        let caps = Capabilities::detect(&voice);
        assert!(!caps.recognition);
        assert!(!caps.synthesis);
    }
}
