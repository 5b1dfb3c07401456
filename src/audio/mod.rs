pub mod capture;
#[cfg(feature = "audio-io")]
pub mod input;
#[cfg(feature = "audio-io")]
pub mod output;
#[cfg(any(feature = "stt", feature = "tts"))]
pub mod resampler;
pub mod wav;

pub use capture::{CaptureBackend, CaptureStream};
#[cfg(feature = "audio-io")]
pub use input::CpalCapture;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Encoded microphone recording ready to be uploaded to the backend's
/// voice endpoint.
#[derive(Debug, Clone)]
pub struct AudioPayload {
    /// WAV container bytes (16-bit PCM)
    pub data: Vec<u8>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioPayload {
    /// Base64 representation, as expected by the `audio` multipart field.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.data)
    }

    /// Approximate clip duration derived from the PCM body length.
    pub fn duration_seconds(&self) -> f32 {
        let header = wav::WAV_HEADER_LEN.min(self.data.len());
        let pcm_bytes = self.data.len() - header;
        let frame_bytes = 2 * self.channels as usize;
        if frame_bytes == 0 || self.sample_rate == 0 {
            return 0.0;
        }
        (pcm_bytes / frame_bytes) as f32 / self.sample_rate as f32
    }
}
