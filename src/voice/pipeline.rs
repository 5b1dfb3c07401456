//! Voice pipeline bridging the UI thread and the voice session
//!
//! The UI sends commands over a crossbeam channel and polls events each
//! frame; the worker thread hosts a tokio runtime on which listening,
//! recording, and synthesis tasks run.

use crate::audio::AudioPayload;
use crate::voice::session::VoiceSession;
use crate::{BanklineError, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{error, info};

/// Commands that can be sent to the voice pipeline
#[derive(Debug, Clone)]
pub enum VoiceCommand {
    /// Start a single-utterance listen
    StartListening,

    /// Cancel the in-flight listen or recording
    StopListening,

    /// Speak text through the synthesis engine
    Speak {
        text: String,
        voice: Option<String>,
    },

    /// Record a microphone clip for server-side transcription
    RecordClip { duration: Duration },

    /// Shutdown the pipeline
    Shutdown,
}

/// Events emitted by the voice pipeline
#[derive(Debug, Clone)]
pub enum VoiceEvent {
    /// A listen attempt is now active
    ListeningStarted,

    /// A transcript arrived for the active listen
    Transcript(String),

    /// The active listen failed (including cancellation)
    ListenFailed(BanklineError),

    /// A clip recording is now active
    RecordingStarted,

    /// The clip recording finished
    ClipRecorded(AudioPayload),

    /// The clip recording failed
    RecordFailed(BanklineError),

    /// Pipeline has shut down
    Shutdown,
}

/// Voice pipeline with channel-based communication
pub struct VoicePipeline {
    session: VoiceSession,
    command_tx: Sender<VoiceCommand>,
    command_rx: Receiver<VoiceCommand>,
    event_tx: Sender<VoiceEvent>,
    event_rx: Receiver<VoiceEvent>,
}

impl VoicePipeline {
    pub fn new(session: VoiceSession) -> Self {
        let (command_tx, command_rx) = bounded(100);
        let (event_tx, event_rx) = bounded(100);

        Self {
            session,
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        }
    }

    pub fn command_sender(&self) -> Sender<VoiceCommand> {
        self.command_tx.clone()
    }

    pub fn event_receiver(&self) -> Receiver<VoiceEvent> {
        self.event_rx.clone()
    }

    /// Start the pipeline worker thread.
    pub fn start_worker(self) -> Result<()> {
        let VoicePipeline {
            session,
            command_rx,
            event_tx,
            ..
        } = self;

        std::thread::spawn(move || {
            info!("Voice pipeline worker starting");

            let runtime = match Runtime::new() {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!("Failed to create tokio runtime: {}", e);
                    let _ = event_tx.send(VoiceEvent::Shutdown);
                    return;
                }
            };

            let session = Arc::new(session);
            let _runtime_guard = runtime.enter();

            loop {
                match command_rx.recv() {
                    Ok(VoiceCommand::StartListening) => {
                        if session.is_listening() {
                            let _ = event_tx
                                .send(VoiceEvent::ListenFailed(BanklineError::AlreadyListening));
                            continue;
                        }

                        let session = Arc::clone(&session);
                        let event_tx = event_tx.clone();
                        tokio::spawn(async move {
                            let _ = event_tx.send(VoiceEvent::ListeningStarted);
                            match session.start_listening().await {
                                Ok(transcript) => {
                                    let _ = event_tx.send(VoiceEvent::Transcript(transcript));
                                }
                                Err(e) => {
                                    let _ = event_tx.send(VoiceEvent::ListenFailed(e));
                                }
                            }
                        });
                    }

                    Ok(VoiceCommand::StopListening) => {
                        session.stop_listening();
                        session.stop_recording();
                    }

                    Ok(VoiceCommand::Speak { text, voice }) => {
                        session.speak(&text, voice.as_deref());
                    }

                    Ok(VoiceCommand::RecordClip { duration }) => {
                        let session = Arc::clone(&session);
                        let event_tx = event_tx.clone();
                        tokio::spawn(async move {
                            let _ = event_tx.send(VoiceEvent::RecordingStarted);
                            match session.record_audio(duration).await {
                                Ok(payload) => {
                                    let _ = event_tx.send(VoiceEvent::ClipRecorded(payload));
                                }
                                Err(e) => {
                                    let _ = event_tx.send(VoiceEvent::RecordFailed(e));
                                }
                            }
                        });
                    }

                    Ok(VoiceCommand::Shutdown) => {
                        info!("Voice pipeline worker shutting down");
                        session.stop_listening();
                        session.stop_recording();
                        session.stop_speaking();
                        let _ = event_tx.send(VoiceEvent::Shutdown);
                        break;
                    }

                    Err(e) => {
                        error!("Command channel error: {}", e);
                        break;
                    }
                }
            }

            info!("Voice pipeline worker stopped");
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_creation_wires_channels() {
        let pipeline = VoicePipeline::new(VoiceSession::unsupported());
        let _command_tx = pipeline.command_sender();
        let _event_rx = pipeline.event_receiver();
    }

    #[test]
    fn unsupported_session_reports_listen_failure() {
        let pipeline = VoicePipeline::new(VoiceSession::unsupported());
        let command_tx = pipeline.command_sender();
        let event_rx = pipeline.event_receiver();
        pipeline.start_worker().unwrap();

        command_tx.send(VoiceCommand::StartListening).unwrap();

        // started, then failed with UnsupportedCapability
        let mut saw_failure = false;
        for _ in 0..2 {
            match event_rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                VoiceEvent::ListeningStarted => {}
                VoiceEvent::ListenFailed(BanklineError::UnsupportedCapability(_)) => {
                    saw_failure = true;
                }
                other => panic!("unexpected event: {:?}", other),
            }
        }
        assert!(saw_failure);

        command_tx.send(VoiceCommand::Shutdown).unwrap();
    }
}
