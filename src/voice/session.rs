//! Voice interaction session
//!
//! Wraps single-utterance recognition, fire-and-forget synthesis, and
//! bounded microphone recording over the engines the host actually has.
//! At most one listening operation and one recording may be outstanding at
//! a time; both are cancellable. The session holds no state across calls
//! beyond the handles of those in-flight operations.

use crate::audio::capture::CaptureBackend;
use crate::audio::{wav, AudioPayload};
use crate::capability::Capabilities;
use crate::voice::recognizer::{RecognitionErrorCode, SpeechRecognizer};
use crate::voice::synthesizer::{CancelFlag, SpeechSynthesizer};
use crate::{BanklineError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Observable listening state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenState {
    Idle,
    Listening,
}

pub struct VoiceSession {
    capabilities: Capabilities,
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    capture: Option<Arc<dyn CaptureBackend>>,
    /// Cancellation handle of the in-flight listen; `Some` while Listening
    listen_cancel: Mutex<Option<oneshot::Sender<()>>>,
    /// Cancellation flag of the utterance currently being spoken
    speak_cancel: Mutex<Option<CancelFlag>>,
    /// Stop handle of the in-flight recording
    record_stop: Mutex<Option<oneshot::Sender<()>>>,
}

impl VoiceSession {
    pub fn new(
        capabilities: Capabilities,
        recognizer: Option<Arc<dyn SpeechRecognizer>>,
        synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
        capture: Option<Arc<dyn CaptureBackend>>,
    ) -> Self {
        Self {
            capabilities,
            recognizer,
            synthesizer,
            capture,
            listen_cancel: Mutex::new(None),
            speak_cancel: Mutex::new(None),
            record_stop: Mutex::new(None),
        }
    }

    /// A session with no engines at all (text-only host).
    pub fn unsupported() -> Self {
        Self::new(Capabilities::none(), None, None, None)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn listen_state(&self) -> ListenState {
        if self.listen_cancel.lock().is_some() {
            ListenState::Listening
        } else {
            ListenState::Idle
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listen_state() == ListenState::Listening
    }

    /// Listen for a single utterance and return its transcript.
    ///
    /// Suspends the caller until a transcript arrives, an error occurs, or
    /// [`stop_listening`](Self::stop_listening) cancels the attempt (which
    /// resolves as `RecognitionError(aborted)`). Only one invocation may be
    /// in flight; a concurrent call fails with `AlreadyListening` without
    /// disturbing the first.
    pub async fn start_listening(&self) -> Result<String> {
        let recognizer = match (&self.recognizer, self.capabilities.recognition) {
            (Some(recognizer), true) => Arc::clone(recognizer),
            _ => {
                return Err(BanklineError::UnsupportedCapability(
                    "speech recognition".into(),
                ))
            }
        };

        let mut cancel_rx = {
            let mut slot = self.listen_cancel.lock();
            if slot.is_some() {
                return Err(BanklineError::AlreadyListening);
            }
            let (cancel_tx, cancel_rx) = oneshot::channel();
            *slot = Some(cancel_tx);
            cancel_rx
        };

        let outcome = tokio::select! {
            result = recognizer.recognize_utterance() => result,
            _ = &mut cancel_rx => {
                debug!("Listening cancelled");
                Err(BanklineError::Recognition(RecognitionErrorCode::Aborted))
            }
        };

        // Back to Idle on every exit path
        self.listen_cancel.lock().take();
        outcome
    }

    /// Cancel an in-flight listen. Safe to call when idle (no-op).
    pub fn stop_listening(&self) {
        if let Some(cancel) = self.listen_cancel.lock().take() {
            let _ = cancel.send(());
        }
    }

    /// Speak `text`, cancelling whatever is currently playing first.
    ///
    /// Fire-and-forget: synthesis and playback run on a spawned task. Must
    /// be called from within a tokio runtime. A no-op with a logged warning
    /// when synthesis is unsupported.
    pub fn speak(&self, text: &str, voice: Option<&str>) {
        let synthesizer = match (&self.synthesizer, self.capabilities.synthesis) {
            (Some(synthesizer), true) => Arc::clone(synthesizer),
            _ => {
                warn!("Speech synthesis not supported; skipping utterance");
                return;
            }
        };

        let cancel = CancelFlag::new();
        if let Some(previous) = self.speak_cancel.lock().replace(cancel.clone()) {
            previous.cancel();
        }

        let text = text.to_string();
        let voice = voice.map(str::to_string);
        tokio::spawn(async move {
            if let Err(e) = synthesizer.speak(&text, voice.as_deref(), cancel).await {
                warn!("Speech synthesis failed: {}", e);
            }
        });
    }

    /// Stop whatever synthesis is currently playing.
    pub fn stop_speaking(&self) {
        if let Some(current) = self.speak_cancel.lock().take() {
            current.cancel();
        }
    }

    /// Record microphone audio until `duration` elapses or
    /// [`stop_recording`](Self::stop_recording) is called, then return the
    /// encoded payload. The capture stream is released exactly once on
    /// every exit path.
    pub async fn record_audio(&self, duration: Duration) -> Result<AudioPayload> {
        let capture = match (&self.capture, self.capabilities.capture) {
            (Some(capture), true) => Arc::clone(capture),
            _ => {
                return Err(BanklineError::UnsupportedCapability(
                    "microphone capture".into(),
                ))
            }
        };

        let stop_rx = {
            let mut slot = self.record_stop.lock();
            if slot.is_some() {
                return Err(BanklineError::AudioDevice(
                    "Microphone is already recording".into(),
                ));
            }
            let (stop_tx, stop_rx) = oneshot::channel();
            *slot = Some(stop_tx);
            stop_rx
        };

        let outcome = record_from(capture, duration, stop_rx).await;
        self.record_stop.lock().take();
        outcome
    }

    /// End an in-flight recording early. Safe to call when idle (no-op).
    pub fn stop_recording(&self) {
        if let Some(stop) = self.record_stop.lock().take() {
            let _ = stop.send(());
        }
    }
}

async fn record_from(
    capture: Arc<dyn CaptureBackend>,
    duration: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) -> Result<AudioPayload> {
    let mut stream = capture.open().await?;
    let sample_rate = stream.sample_rate();

    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);

    let mut samples: Vec<f32> = Vec::new();
    let outcome = loop {
        tokio::select! {
            chunk = stream.next_chunk() => match chunk {
                Ok(Some(data)) => samples.extend_from_slice(&data),
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            },
            _ = &mut deadline => {
                debug!("Recording reached {}ms limit", duration.as_millis());
                break Ok(());
            }
            _ = &mut stop_rx => {
                debug!("Recording stopped early");
                break Ok(());
            }
        }
    };

    // The one release of the exclusive microphone stream
    stream.close().await;
    outcome?;

    if samples.is_empty() {
        return Err(BanklineError::AudioProcessing("No audio captured".into()));
    }

    let data = wav::encode_wav(&samples, sample_rate, 1)?;
    Ok(AudioPayload {
        data,
        sample_rate,
        channels: 1,
    })
}
