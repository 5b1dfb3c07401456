//! Chat pipeline for backend requests
//!
//! Provides a channel-based interface between the UI thread and the HTTP
//! clients: commands in, events out, one worker thread hosting a tokio
//! runtime. Requests are serialized; there is no retry logic. Dropping the
//! worker (Shutdown) tears the runtime down, which aborts whatever request
//! is still in flight.

use crate::audio::AudioPayload;
use crate::chat::client::ChatClient;
use crate::chat::context::SessionContext;
use crate::chat::types::{ChatReply, IntentInfo, KnowledgeBaseArticle};
use crate::config::BackendConfig;
use crate::dashboard::{DashboardClient, DashboardSnapshot};
use crate::{BanklineError, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use tokio::runtime::Runtime;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Commands that can be sent to the chat pipeline
#[derive(Debug, Clone)]
pub enum ChatCommand {
    /// Send a text message to the assistant
    SendText { text: String, request_id: Uuid },

    /// Upload a recorded voice clip to the assistant
    SendVoice {
        payload: AudioPayload,
        request_id: Uuid,
    },

    /// Fetch the intents the backend supports
    FetchIntents { request_id: Uuid },

    /// Search the backend knowledge base
    SearchKnowledgeBase { query: String, request_id: Uuid },

    /// Fetch a fresh dashboard snapshot
    RefreshDashboard { request_id: Uuid },

    /// Shutdown the pipeline
    Shutdown,
}

/// Events emitted by the chat pipeline
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// The assistant replied to a text or voice message
    Reply { reply: ChatReply, request_id: Uuid },

    /// Supported intents arrived
    Intents {
        intents: Vec<IntentInfo>,
        request_id: Uuid,
    },

    /// Knowledge base results arrived
    KnowledgeBase {
        articles: Vec<KnowledgeBaseArticle>,
        request_id: Uuid,
    },

    /// A dashboard snapshot arrived
    Dashboard {
        snapshot: DashboardSnapshot,
        request_id: Uuid,
    },

    /// A request failed
    Error {
        error: BanklineError,
        request_id: Option<Uuid>,
    },

    /// Pipeline has shut down
    Shutdown,
}

/// Chat pipeline with channel-based communication
pub struct ChatPipeline {
    backend: BackendConfig,
    session: SessionContext,
    command_tx: Sender<ChatCommand>,
    command_rx: Receiver<ChatCommand>,
    event_tx: Sender<ChatEvent>,
    event_rx: Receiver<ChatEvent>,
}

impl ChatPipeline {
    pub fn new(backend: BackendConfig, session: SessionContext) -> Self {
        let (command_tx, command_rx) = bounded(100);
        let (event_tx, event_rx) = bounded(100);

        Self {
            backend,
            session,
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        }
    }

    pub fn command_sender(&self) -> Sender<ChatCommand> {
        self.command_tx.clone()
    }

    pub fn event_receiver(&self) -> Receiver<ChatEvent> {
        self.event_rx.clone()
    }

    /// Start the pipeline worker thread.
    pub fn start_worker(self) -> Result<()> {
        let ChatPipeline {
            backend,
            session,
            command_rx,
            event_tx,
            ..
        } = self;

        std::thread::spawn(move || {
            info!("Chat pipeline worker starting");

            let runtime = match Runtime::new() {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!("Failed to create tokio runtime: {}", e);
                    let _ = event_tx.send(ChatEvent::Error {
                        error: BanklineError::Channel(format!("Runtime creation failed: {}", e)),
                        request_id: None,
                    });
                    let _ = event_tx.send(ChatEvent::Shutdown);
                    return;
                }
            };

            let chat = match ChatClient::new(&backend) {
                Ok(client) => client,
                Err(e) => {
                    error!("Failed to create chat client: {}", e);
                    let _ = event_tx.send(ChatEvent::Error {
                        error: e,
                        request_id: None,
                    });
                    let _ = event_tx.send(ChatEvent::Shutdown);
                    return;
                }
            };

            let dashboard = match DashboardClient::new(&backend) {
                Ok(client) => client,
                Err(e) => {
                    error!("Failed to create dashboard client: {}", e);
                    let _ = event_tx.send(ChatEvent::Error {
                        error: e,
                        request_id: None,
                    });
                    let _ = event_tx.send(ChatEvent::Shutdown);
                    return;
                }
            };

            info!("Chat pipeline worker ready");

            loop {
                match command_rx.recv() {
                    Ok(ChatCommand::SendText { text, request_id }) => {
                        debug!("Processing chat request: {}", request_id);
                        let result = runtime.block_on(chat.send_message(&text, &session));
                        send_reply(&event_tx, result, request_id);
                    }

                    Ok(ChatCommand::SendVoice {
                        payload,
                        request_id,
                    }) => {
                        debug!("Processing voice request: {}", request_id);
                        let result = runtime.block_on(chat.send_voice(&payload, &session));
                        send_reply(&event_tx, result, request_id);
                    }

                    Ok(ChatCommand::FetchIntents { request_id }) => {
                        match runtime.block_on(chat.supported_intents()) {
                            Ok(intents) => {
                                let _ = event_tx.send(ChatEvent::Intents {
                                    intents,
                                    request_id,
                                });
                            }
                            Err(error) => {
                                let _ = event_tx.send(ChatEvent::Error {
                                    error,
                                    request_id: Some(request_id),
                                });
                            }
                        }
                    }

                    Ok(ChatCommand::SearchKnowledgeBase { query, request_id }) => {
                        match runtime.block_on(chat.search_knowledge_base(&query)) {
                            Ok(articles) => {
                                let _ = event_tx.send(ChatEvent::KnowledgeBase {
                                    articles,
                                    request_id,
                                });
                            }
                            Err(error) => {
                                let _ = event_tx.send(ChatEvent::Error {
                                    error,
                                    request_id: Some(request_id),
                                });
                            }
                        }
                    }

                    Ok(ChatCommand::RefreshDashboard { request_id }) => {
                        match runtime.block_on(dashboard.snapshot()) {
                            Ok(snapshot) => {
                                let _ = event_tx.send(ChatEvent::Dashboard {
                                    snapshot,
                                    request_id,
                                });
                            }
                            Err(error) => {
                                let _ = event_tx.send(ChatEvent::Error {
                                    error,
                                    request_id: Some(request_id),
                                });
                            }
                        }
                    }

                    Ok(ChatCommand::Shutdown) => {
                        info!("Chat pipeline worker shutting down");
                        let _ = event_tx.send(ChatEvent::Shutdown);
                        break;
                    }

                    Err(e) => {
                        error!("Command channel error: {}", e);
                        break;
                    }
                }
            }

            info!("Chat pipeline worker stopped");
        });

        Ok(())
    }
}

fn send_reply(event_tx: &Sender<ChatEvent>, result: Result<ChatReply>, request_id: Uuid) {
    match result {
        Ok(reply) => {
            let _ = event_tx.send(ChatEvent::Reply { reply, request_id });
        }
        Err(error) => {
            let _ = event_tx.send(ChatEvent::Error {
                error,
                request_id: Some(request_id),
            });
        }
    }
}
