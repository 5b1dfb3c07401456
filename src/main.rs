use anyhow::Result;
use bankline::capability::Capabilities;
use bankline::chat::{ChatPipeline, SessionContext};
use bankline::config::AppConfig;
use bankline::ui::app::{AppChannels, BanklineApp};
use bankline::voice::{self, VoicePipeline};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bankline=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Bankline banking assistant client");

    let config = AppConfig::load_or_default();
    let capabilities = Capabilities::detect(&config.voice);

    // One session context per conversation, threaded through every call
    let session = SessionContext::new(config.user_id.clone());
    info!(session_id = %session.session_id, "Opened conversation session");

    let chat = ChatPipeline::new(config.backend.clone(), session.clone());
    let chat_tx = chat.command_sender();
    let chat_rx = chat.event_receiver();
    chat.start_worker()
        .map_err(|e| anyhow::anyhow!("failed to start chat pipeline: {e}"))?;

    let voice_session = voice::build_session(&config.voice, capabilities);
    let capabilities = voice_session.capabilities();
    let voice = VoicePipeline::new(voice_session);
    let voice_tx = voice.command_sender();
    let voice_rx = voice.event_receiver();
    voice
        .start_worker()
        .map_err(|e| anyhow::anyhow!("failed to start voice pipeline: {e}"))?;

    let channels = AppChannels {
        chat_tx,
        chat_rx,
        voice_tx,
        voice_rx,
    };

    eframe::run_native(
        "Bankline",
        eframe::NativeOptions::default(),
        Box::new(move |cc| {
            Ok(Box::new(BanklineApp::new(
                cc,
                &config,
                session,
                capabilities,
                channels,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("failed to run UI: {e}"))?;

    Ok(())
}
