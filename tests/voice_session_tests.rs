//! Voice session behavior: single-outstanding listen, cancellation, and
//! microphone release guarantees, exercised against scripted engines.

use async_trait::async_trait;
use bankline::audio::capture::{CaptureBackend, CaptureStream};
use bankline::audio::wav;
use bankline::capability::Capabilities;
use bankline::voice::recognizer::{RecognitionErrorCode, SpeechRecognizer};
use bankline::voice::session::{ListenState, VoiceSession};
use bankline::{BanklineError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct ScriptedRecognizer {
    transcript: String,
    delay: Duration,
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    async fn recognize_utterance(&self) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        Ok(self.transcript.clone())
    }
}

/// A recognizer that never resolves; only cancellation can finish it.
struct PendingRecognizer;

#[async_trait]
impl SpeechRecognizer for PendingRecognizer {
    async fn recognize_utterance(&self) -> Result<String> {
        std::future::pending::<()>().await;
        unreachable!()
    }
}

fn listening_session(recognizer: Arc<dyn SpeechRecognizer>) -> VoiceSession {
    VoiceSession::new(
        Capabilities {
            recognition: true,
            synthesis: false,
            capture: false,
        },
        Some(recognizer),
        None,
        None,
    )
}

#[tokio::test]
async fn listen_resolves_with_transcript_and_returns_to_idle() {
    let session = listening_session(Arc::new(ScriptedRecognizer {
        transcript: "check my account balance".to_string(),
        delay: Duration::from_millis(10),
    }));

    let transcript = session.start_listening().await.unwrap();
    assert_eq!(transcript, "check my account balance");
    assert_eq!(session.listen_state(), ListenState::Idle);
}

#[tokio::test]
async fn second_listen_is_rejected_without_cancelling_the_first() {
    let session = Arc::new(listening_session(Arc::new(ScriptedRecognizer {
        transcript: "transfer money".to_string(),
        delay: Duration::from_millis(200),
    })));

    let first = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.start_listening().await })
    };

    // Give the first listen time to take the slot
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(session.listen_state(), ListenState::Listening);

    let second = session.start_listening().await;
    assert!(matches!(second, Err(BanklineError::AlreadyListening)));

    // The first listen still resolves normally
    let first = first.await.unwrap().unwrap();
    assert_eq!(first, "transfer money");
    assert_eq!(session.listen_state(), ListenState::Idle);
}

#[tokio::test]
async fn stop_listening_while_idle_is_a_noop() {
    let session = listening_session(Arc::new(ScriptedRecognizer {
        transcript: "hello".to_string(),
        delay: Duration::from_millis(5),
    }));

    session.stop_listening();
    assert_eq!(session.listen_state(), ListenState::Idle);

    // A later listen is unaffected
    assert_eq!(session.start_listening().await.unwrap(), "hello");
}

#[tokio::test]
async fn stop_listening_cancels_the_in_flight_listen() {
    let session = Arc::new(listening_session(Arc::new(PendingRecognizer)));

    let listen = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.start_listening().await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    session.stop_listening();

    let outcome = listen.await.unwrap();
    assert!(matches!(
        outcome,
        Err(BanklineError::Recognition(RecognitionErrorCode::Aborted))
    ));
    assert_eq!(session.listen_state(), ListenState::Idle);
}

struct CountingCapture {
    releases: Arc<AtomicUsize>,
    /// Fail `next_chunk` after this many delivered chunks
    fail_after: Option<usize>,
}

struct CountingStream {
    releases: Arc<AtomicUsize>,
    fail_after: Option<usize>,
    delivered: usize,
}

#[async_trait]
impl CaptureBackend for CountingCapture {
    async fn open(&self) -> Result<Box<dyn CaptureStream>> {
        Ok(Box::new(CountingStream {
            releases: Arc::clone(&self.releases),
            fail_after: self.fail_after,
            delivered: 0,
        }))
    }

    fn name(&self) -> &str {
        "counting"
    }
}

#[async_trait]
impl CaptureStream for CountingStream {
    fn sample_rate(&self) -> u32 {
        16000
    }

    async fn next_chunk(&mut self) -> Result<Option<Vec<f32>>> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if let Some(limit) = self.fail_after {
            if self.delivered >= limit {
                return Err(BanklineError::AudioDevice("stream failed".into()));
            }
        }
        self.delivered += 1;
        Ok(Some(vec![0.25f32; 160]))
    }

    async fn close(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

fn recording_session(capture: Arc<CountingCapture>) -> VoiceSession {
    VoiceSession::new(
        Capabilities {
            recognition: false,
            synthesis: false,
            capture: true,
        },
        None,
        None,
        Some(capture),
    )
}

#[tokio::test]
async fn record_releases_the_stream_once_when_duration_elapses() {
    let releases = Arc::new(AtomicUsize::new(0));
    let session = recording_session(Arc::new(CountingCapture {
        releases: Arc::clone(&releases),
        fail_after: None,
    }));

    let payload = session
        .record_audio(Duration::from_millis(60))
        .await
        .unwrap();

    assert_eq!(releases.load(Ordering::SeqCst), 1);

    // The payload is a decodable mono WAV at the stream rate
    let (samples, rate, channels) = wav::decode_wav(&payload.data).unwrap();
    assert_eq!(rate, 16000);
    assert_eq!(channels, 1);
    assert!(!samples.is_empty());
}

#[tokio::test]
async fn record_releases_the_stream_once_on_explicit_stop() {
    let releases = Arc::new(AtomicUsize::new(0));
    let session = Arc::new(recording_session(Arc::new(CountingCapture {
        releases: Arc::clone(&releases),
        fail_after: None,
    })));

    let recording = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.record_audio(Duration::from_secs(30)).await })
    };

    tokio::time::sleep(Duration::from_millis(60)).await;
    session.stop_recording();

    let payload = recording.await.unwrap().unwrap();
    assert_eq!(releases.load(Ordering::SeqCst), 1);
    assert!(payload.duration_seconds() > 0.0);
}

#[tokio::test]
async fn record_releases_the_stream_once_on_error() {
    let releases = Arc::new(AtomicUsize::new(0));
    let session = recording_session(Arc::new(CountingCapture {
        releases: Arc::clone(&releases),
        fail_after: Some(0),
    }));

    let outcome = session.record_audio(Duration::from_secs(1)).await;
    assert!(matches!(outcome, Err(BanklineError::AudioDevice(_))));
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stop_recording_while_idle_is_a_noop() {
    let session = VoiceSession::unsupported();
    session.stop_recording();
}
