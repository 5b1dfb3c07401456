//! Microphone capture seam
//!
//! The microphone is the one exclusive resource in the application: a
//! stream is acquired per recording and must be released exactly once on
//! every exit path. `CaptureStream::close` is that release; `Drop`
//! implementations act as a backstop when a stream is abandoned mid-await.

use crate::Result;
use async_trait::async_trait;

/// Source of microphone capture streams.
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Acquire the microphone and start delivering samples.
    async fn open(&self) -> Result<Box<dyn CaptureStream>>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// An open microphone stream delivering mono f32 chunks.
#[async_trait]
pub trait CaptureStream: Send {
    fn sample_rate(&self) -> u32;

    /// Next chunk of mono samples; `None` once the stream has ended.
    async fn next_chunk(&mut self) -> Result<Option<Vec<f32>>>;

    /// Release the device. Idempotent.
    async fn close(&mut self);
}
