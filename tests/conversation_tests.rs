//! Conversation log behavior driven through the UI state: append order,
//! empty-input handling, and the failure fallback path.

use bankline::capability::Capabilities;
use bankline::chat::pipeline::{ChatCommand, ChatEvent};
use bankline::chat::types::ChatReply;
use bankline::chat::SessionContext;
use bankline::messages::Sender;
use bankline::ui::state::{AppState, FALLBACK_REPLY};
use bankline::voice::pipeline::{VoiceCommand, VoiceEvent};
use bankline::BanklineError;
use crossbeam_channel::{unbounded, Receiver, Sender as ChannelSender};
use serde_json::json;
use uuid::Uuid;

struct Harness {
    state: AppState,
    chat_commands: Receiver<ChatCommand>,
    chat_events: ChannelSender<ChatEvent>,
    voice_events: ChannelSender<VoiceEvent>,
    #[allow(dead_code)]
    voice_commands: Receiver<VoiceCommand>,
}

fn harness() -> Harness {
    let (chat_command_tx, chat_command_rx) = unbounded();
    let (chat_event_tx, chat_event_rx) = unbounded();
    let (voice_command_tx, voice_command_rx) = unbounded();
    let (voice_event_tx, voice_event_rx) = unbounded();

    let mut state = AppState::new(SessionContext::new("demo_user"), Capabilities::none());
    state.speak_replies = false;
    state.connect_chat(chat_command_tx, chat_event_rx);
    state.connect_voice(voice_command_tx, voice_event_rx);

    Harness {
        state,
        chat_commands: chat_command_rx,
        chat_events: chat_event_tx,
        voice_events: voice_event_tx,
        voice_commands: voice_command_rx,
    }
}

fn sample_reply() -> ChatReply {
    serde_json::from_value(json!({
        "message": "Your current balance is £2,450.30.",
        "intent": "account_balance",
        "confidence": 0.95,
        "suggestions": ["View transactions"]
    }))
    .unwrap()
}

fn sent_request_id(commands: &Receiver<ChatCommand>) -> Uuid {
    match commands.try_recv().expect("expected an outbound request") {
        ChatCommand::SendText { request_id, .. } => request_id,
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn whitespace_only_input_produces_no_request_and_no_message() {
    let mut h = harness();
    let before = h.state.conversation.len();

    h.state.send_message("   \t\n  ");

    assert!(h.chat_commands.try_recv().is_err());
    assert_eq!(h.state.conversation.len(), before);
}

#[test]
fn successful_send_appends_user_then_assistant_exactly_once() {
    let mut h = harness();

    h.state.send_message("Check my account balance");

    // User message is visible immediately
    let log = h.state.conversation.get_all();
    assert_eq!(log.len(), 2); // greeting + user
    assert_eq!(log[1].sender, Sender::User);
    assert_eq!(log[1].text, "Check my account balance");
    assert!(h.state.awaiting_reply());

    let request_id = sent_request_id(&h.chat_commands);
    h.chat_events
        .send(ChatEvent::Reply {
            reply: sample_reply(),
            request_id,
        })
        .unwrap();

    h.state.poll_events();

    let log = h.state.conversation.get_all();
    assert_eq!(log.len(), 3); // greeting + user + assistant
    assert_eq!(log[2].sender, Sender::Assistant);
    assert_eq!(log[2].text, "Your current balance is £2,450.30.");
    assert_eq!(log[2].intent.as_deref(), Some("account_balance"));
    assert_eq!(log[2].confidence, Some(0.95));
    assert!(!h.state.awaiting_reply());
    assert!(h.state.error.is_none());
}

#[test]
fn network_failure_appends_one_fallback_and_sets_the_error_flag() {
    let mut h = harness();

    h.state.send_message("Check my account balance");
    let request_id = sent_request_id(&h.chat_commands);

    h.chat_events
        .send(ChatEvent::Error {
            error: BanklineError::Network("connection refused".into()),
            request_id: Some(request_id),
        })
        .unwrap();

    h.state.poll_events();

    let log = h.state.conversation.get_all();
    assert_eq!(log.len(), 3); // greeting + user + fallback
    assert_eq!(log[2].sender, Sender::Assistant);
    assert_eq!(log[2].text, FALLBACK_REPLY);
    assert!(h.state.error.is_some());
    assert!(!h.state.awaiting_reply());

    // A second poll does not duplicate the fallback
    h.state.poll_events();
    assert_eq!(h.state.conversation.len(), 3);
}

#[test]
fn stale_reply_for_an_unknown_request_is_ignored() {
    let mut h = harness();
    let before = h.state.conversation.len();

    h.chat_events
        .send(ChatEvent::Reply {
            reply: sample_reply(),
            request_id: Uuid::new_v4(),
        })
        .unwrap();

    h.state.poll_events();
    assert_eq!(h.state.conversation.len(), before);
}

#[test]
fn empty_transcript_from_voice_input_sends_nothing() {
    let mut h = harness();

    h.voice_events
        .send(VoiceEvent::Transcript("   ".to_string()))
        .unwrap();
    h.state.poll_events();

    assert!(h.chat_commands.try_recv().is_err());
    assert_eq!(h.state.conversation.len(), 1); // greeting only
}

#[test]
fn voice_transcript_is_sent_like_typed_text() {
    let mut h = harness();

    h.voice_events
        .send(VoiceEvent::Transcript("view recent transactions".to_string()))
        .unwrap();
    h.state.poll_events();

    let request_id = sent_request_id(&h.chat_commands);
    assert_ne!(request_id, Uuid::nil());

    let log = h.state.conversation.get_all();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].text, "view recent transactions");
}

#[test]
fn cancelled_listen_does_not_raise_an_error_banner() {
    let mut h = harness();

    h.voice_events
        .send(VoiceEvent::ListenFailed(BanklineError::Recognition(
            bankline::RecognitionErrorCode::Aborted,
        )))
        .unwrap();
    h.state.poll_events();

    assert!(h.state.error.is_none());
}

#[test]
fn recognition_failure_raises_the_error_banner() {
    let mut h = harness();

    h.voice_events
        .send(VoiceEvent::ListenFailed(BanklineError::Recognition(
            bankline::RecognitionErrorCode::AudioCapture,
        )))
        .unwrap();
    h.state.poll_events();

    assert_eq!(
        h.state.error.as_deref(),
        Some("Voice input failed. Please try typing instead.")
    );
}

#[test]
fn sends_are_blocked_while_a_reply_is_outstanding() {
    let mut h = harness();

    h.state.send_message("first");
    let _request_id = sent_request_id(&h.chat_commands);

    h.state.send_message("second");
    assert!(h.chat_commands.try_recv().is_err());
    assert_eq!(h.state.conversation.len(), 2); // greeting + first only
}
