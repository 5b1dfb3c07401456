//! Application state management
//!
//! Central state for the Bankline UI. All backend work happens in the
//! chat and voice pipelines; the state owns their channel handles and is
//! polled once per frame.

use crate::capability::Capabilities;
use crate::chat::pipeline::{ChatCommand, ChatEvent};
use crate::chat::types::{ChatReply, IntentInfo, KnowledgeBaseArticle};
use crate::chat::SessionContext;
use crate::dashboard::DashboardSnapshot;
use crate::messages::{ConversationLog, Message};
use crate::voice::pipeline::{VoiceCommand, VoiceEvent};
use crate::BanklineError;
use crossbeam_channel::{Receiver, Sender};
use std::collections::VecDeque;
use std::time::Duration;
use uuid::Uuid;

/// Deterministic assistant message substituted when a send fails.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I encountered an error processing your request. Please try again.";

/// Log entry for a voice clip sent without local transcription.
pub const VOICE_CLIP_PLACEHOLDER: &str = "Voice message";

/// Which main view is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Conversation,
    Dashboard,
}

/// Voice input status driven by pipeline events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceInputState {
    Idle,
    Listening,
    Recording,
}

/// Central application state
pub struct AppState {
    /// Ordered conversation log (thread-safe)
    pub conversation: ConversationLog,

    /// Current text input
    pub input_text: String,

    /// Which view is visible
    pub view: View,

    /// Voice input status
    pub voice_input: VoiceInputState,

    /// Last error shown in the inline banner
    pub error: Option<String>,

    /// Session identity attached to outbound calls
    pub session: SessionContext,

    /// Host capability descriptor probed at startup
    pub capabilities: Capabilities,

    /// Speak assistant replies when synthesis is available
    pub speak_replies: bool,

    /// Duration of clips recorded for server-side transcription
    pub record_duration: Duration,

    /// Latest dashboard snapshot, if fetched
    pub dashboard: Option<DashboardSnapshot>,

    /// Supported intents shown in the status panel
    pub intents: Vec<IntentInfo>,

    /// Knowledge base search state
    pub kb_query: String,
    pub kb_results: Vec<KnowledgeBaseArticle>,

    /// Whether to show the status side panel
    pub show_status_panel: bool,

    /// Recent activity lines for the status panel
    pub activity_log: VecDeque<String>,

    // In-flight request tracking
    pending_chat: Option<Uuid>,
    pending_dashboard: Option<Uuid>,
    pending_intents: Option<Uuid>,
    pending_kb: Option<Uuid>,

    // Pipeline channels
    chat_command_tx: Option<Sender<ChatCommand>>,
    chat_event_rx: Option<Receiver<ChatEvent>>,
    voice_command_tx: Option<Sender<VoiceCommand>>,
    voice_event_rx: Option<Receiver<VoiceEvent>>,
}

impl AppState {
    pub fn new(session: SessionContext, capabilities: Capabilities) -> Self {
        Self {
            conversation: ConversationLog::with_greeting(),
            input_text: String::new(),
            view: View::Conversation,
            voice_input: VoiceInputState::Idle,
            error: None,
            session,
            capabilities,
            speak_replies: true,
            record_duration: Duration::from_millis(5000),
            dashboard: None,
            intents: Vec::new(),
            kb_query: String::new(),
            kb_results: Vec::new(),
            show_status_panel: false,
            activity_log: VecDeque::with_capacity(100),
            pending_chat: None,
            pending_dashboard: None,
            pending_intents: None,
            pending_kb: None,
            chat_command_tx: None,
            chat_event_rx: None,
            voice_command_tx: None,
            voice_event_rx: None,
        }
    }

    /// Attach the chat pipeline channels.
    pub fn connect_chat(&mut self, tx: Sender<ChatCommand>, rx: Receiver<ChatEvent>) {
        self.chat_command_tx = Some(tx);
        self.chat_event_rx = Some(rx);
    }

    /// Attach the voice pipeline channels.
    pub fn connect_voice(&mut self, tx: Sender<VoiceCommand>, rx: Receiver<VoiceEvent>) {
        self.voice_command_tx = Some(tx);
        self.voice_event_rx = Some(rx);
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        if self.activity_log.len() >= 100 {
            self.activity_log.pop_front();
        }
        self.activity_log.push_back(line.into());
    }

    /// Whether a chat reply is outstanding.
    pub fn awaiting_reply(&self) -> bool {
        self.pending_chat.is_some()
    }

    pub fn dashboard_loading(&self) -> bool {
        self.pending_dashboard.is_some()
    }

    pub fn kb_searching(&self) -> bool {
        self.pending_kb.is_some()
    }

    /// Send a text message to the assistant.
    ///
    /// Whitespace-only input is dropped without any outbound request or
    /// log entry. The user message is appended immediately; the reply (or
    /// the fallback on failure) arrives through `poll_events`.
    pub fn send_message(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() || self.awaiting_reply() {
            return;
        }

        self.conversation.add(Message::user(text));
        self.error = None;

        if let Some(tx) = &self.chat_command_tx {
            let request_id = Uuid::new_v4();
            let _ = tx.send(ChatCommand::SendText {
                text: text.to_string(),
                request_id,
            });
            self.pending_chat = Some(request_id);
        }

        self.input_text.clear();
    }

    /// Send whatever is in the input box.
    pub fn send_input(&mut self) {
        let text = std::mem::take(&mut self.input_text);
        self.send_message(&text);
    }

    /// Toggle voice input: start listening (or clip recording when only
    /// capture is available), or stop whatever is active.
    pub fn toggle_voice_input(&mut self) {
        if self.voice_input != VoiceInputState::Idle {
            if let Some(tx) = &self.voice_command_tx {
                let _ = tx.send(VoiceCommand::StopListening);
            }
            self.voice_input = VoiceInputState::Idle;
            return;
        }

        let Some(tx) = &self.voice_command_tx else {
            return;
        };

        if self.capabilities.recognition {
            let _ = tx.send(VoiceCommand::StartListening);
        } else if self.capabilities.capture {
            let _ = tx.send(VoiceCommand::RecordClip {
                duration: self.record_duration,
            });
        } else {
            self.error = Some("Voice input is not supported on this device.".to_string());
        }
    }

    /// Speak one message out loud, replacing any current speech.
    pub fn speak_text(&mut self, text: &str) {
        if let Some(tx) = &self.voice_command_tx {
            let _ = tx.send(VoiceCommand::Speak {
                text: text.to_string(),
                voice: None,
            });
        }
    }

    /// Request a dashboard snapshot unless one is already on the way.
    pub fn refresh_dashboard(&mut self) {
        if self.dashboard_loading() {
            return;
        }
        if let Some(tx) = &self.chat_command_tx {
            let request_id = Uuid::new_v4();
            let _ = tx.send(ChatCommand::RefreshDashboard { request_id });
            self.pending_dashboard = Some(request_id);
        }
    }

    /// Fetch the supported intents once for the status panel.
    pub fn fetch_intents(&mut self) {
        if self.pending_intents.is_some() || !self.intents.is_empty() {
            return;
        }
        if let Some(tx) = &self.chat_command_tx {
            let request_id = Uuid::new_v4();
            let _ = tx.send(ChatCommand::FetchIntents { request_id });
            self.pending_intents = Some(request_id);
        }
    }

    /// Run a knowledge base search for the current query.
    pub fn search_knowledge_base(&mut self) {
        let query = self.kb_query.trim().to_string();
        if query.is_empty() || self.kb_searching() {
            return;
        }
        if let Some(tx) = &self.chat_command_tx {
            let request_id = Uuid::new_v4();
            let _ = tx.send(ChatCommand::SearchKnowledgeBase { query, request_id });
            self.pending_kb = Some(request_id);
        }
    }

    /// Clear the conversation and start over with the greeting.
    pub fn clear_conversation(&mut self) {
        self.conversation.clear();
        self.conversation = ConversationLog::with_greeting();
        self.pending_chat = None;
        self.error = None;
        self.push_log("Conversation cleared".to_string());
    }

    /// Drain pipeline events. Called once per frame from the UI thread.
    pub fn poll_events(&mut self) {
        let chat_events: Vec<ChatEvent> = self
            .chat_event_rx
            .as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default();
        for event in chat_events {
            self.apply_chat_event(event);
        }

        let voice_events: Vec<VoiceEvent> = self
            .voice_event_rx
            .as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default();
        for event in voice_events {
            self.apply_voice_event(event);
        }
    }

    fn apply_chat_event(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::Reply { reply, request_id } => {
                if self.pending_chat != Some(request_id) {
                    return;
                }
                self.pending_chat = None;
                self.append_reply(&reply);
            }

            ChatEvent::Intents {
                intents,
                request_id,
            } => {
                if self.pending_intents == Some(request_id) {
                    self.pending_intents = None;
                    self.push_log(format!("Loaded {} supported intents", intents.len()));
                    self.intents = intents;
                }
            }

            ChatEvent::KnowledgeBase {
                articles,
                request_id,
            } => {
                if self.pending_kb == Some(request_id) {
                    self.pending_kb = None;
                    self.push_log(format!("Knowledge base returned {} results", articles.len()));
                    self.kb_results = articles;
                }
            }

            ChatEvent::Dashboard {
                snapshot,
                request_id,
            } => {
                if self.pending_dashboard == Some(request_id) {
                    self.pending_dashboard = None;
                    self.push_log("Dashboard refreshed".to_string());
                    self.dashboard = Some(snapshot);
                }
            }

            ChatEvent::Error { error, request_id } => {
                self.apply_chat_error(error, request_id);
            }

            ChatEvent::Shutdown => {
                self.push_log("Chat pipeline shut down".to_string());
            }
        }
    }

    fn apply_chat_error(&mut self, error: BanklineError, request_id: Option<Uuid>) {
        self.push_log(format!("Request failed: {}", error));

        if request_id.is_some() && request_id == self.pending_chat {
            // A failed send gets exactly one fallback assistant message
            self.pending_chat = None;
            self.error = Some(error.user_message());
            self.conversation.add(Message::assistant(FALLBACK_REPLY));
            return;
        }

        if request_id.is_some() && request_id == self.pending_dashboard {
            self.pending_dashboard = None;
            self.error = Some(error.user_message());
            return;
        }

        if request_id.is_some() && request_id == self.pending_intents {
            // The status panel just stays empty
            self.pending_intents = None;
            return;
        }

        if request_id.is_some() && request_id == self.pending_kb {
            self.pending_kb = None;
            self.error = Some(error.user_message());
            return;
        }

        self.error = Some(error.user_message());
    }

    fn append_reply(&mut self, reply: &ChatReply) {
        let mut message = Message::assistant(reply.message.as_str())
            .with_suggestions(reply.suggestions.clone());
        if let Some(intent) = &reply.intent {
            message = message.with_intent(intent, reply.confidence);
        }
        self.conversation.add(message);

        if self.speak_replies && !reply.message.is_empty() {
            self.speak_text(&reply.message);
        }
    }

    fn apply_voice_event(&mut self, event: VoiceEvent) {
        match event {
            VoiceEvent::ListeningStarted => {
                self.voice_input = VoiceInputState::Listening;
                self.push_log("Listening...".to_string());
            }

            VoiceEvent::Transcript(transcript) => {
                self.voice_input = VoiceInputState::Idle;
                self.push_log(format!("Heard: \"{}\"", transcript));
                self.send_message(&transcript);
            }

            VoiceEvent::ListenFailed(error) => {
                self.voice_input = VoiceInputState::Idle;
                match &error {
                    // A deliberate stop is not an error worth a banner
                    BanklineError::Recognition(code)
                        if *code == crate::RecognitionErrorCode::Aborted =>
                    {
                        self.push_log("Listening cancelled".to_string());
                    }
                    BanklineError::AlreadyListening => {
                        self.push_log("Ignored duplicate listen request".to_string());
                    }
                    _ => {
                        self.push_log(format!("Voice input failed: {}", error));
                        self.error = Some(error.user_message());
                    }
                }
            }

            VoiceEvent::RecordingStarted => {
                self.voice_input = VoiceInputState::Recording;
                self.push_log("Recording voice clip...".to_string());
            }

            VoiceEvent::ClipRecorded(payload) => {
                self.voice_input = VoiceInputState::Idle;
                self.push_log(format!(
                    "Recorded {:.1}s clip",
                    payload.duration_seconds()
                ));
                self.send_voice_clip(payload);
            }

            VoiceEvent::RecordFailed(error) => {
                self.voice_input = VoiceInputState::Idle;
                self.push_log(format!("Recording failed: {}", error));
                self.error = Some(error.user_message());
            }

            VoiceEvent::Shutdown => {
                self.push_log("Voice pipeline shut down".to_string());
            }
        }
    }

    fn send_voice_clip(&mut self, payload: crate::audio::AudioPayload) {
        if self.awaiting_reply() {
            return;
        }
        self.conversation.add(Message::user(VOICE_CLIP_PLACEHOLDER));
        self.error = None;

        if let Some(tx) = &self.chat_command_tx {
            let request_id = Uuid::new_v4();
            let _ = tx.send(ChatCommand::SendVoice {
                payload,
                request_id,
            });
            self.pending_chat = Some(request_id);
        }
    }

    /// Ask the pipelines to shut down; in-flight requests are dropped with
    /// their runtimes.
    pub fn shutdown_pipelines(&mut self) {
        if let Some(tx) = &self.chat_command_tx {
            let _ = tx.send(ChatCommand::Shutdown);
        }
        if let Some(tx) = &self.voice_command_tx {
            let _ = tx.send(VoiceCommand::Shutdown);
        }
    }
}
