//! Main application struct and eframe integration

use crate::capability::Capabilities;
use crate::chat::pipeline::{ChatCommand, ChatEvent};
use crate::chat::SessionContext;
use crate::config::AppConfig;
use crate::ui::components::dashboard_panel::DashboardTab;
use crate::ui::components::{DashboardPanel, InputBar, MessageList, StatusPanel};
use crate::ui::state::{AppState, View};
use crate::ui::theme::Theme;
use crate::voice::pipeline::{VoiceCommand, VoiceEvent};
use crossbeam_channel::{Receiver, Sender};
use egui::{self, CentralPanel, RichText, SidePanel, TopBottomPanel};
use std::time::Duration;

/// Channel handles of the already-started worker pipelines.
pub struct AppChannels {
    pub chat_tx: Sender<ChatCommand>,
    pub chat_rx: Receiver<ChatEvent>,
    pub voice_tx: Sender<VoiceCommand>,
    pub voice_rx: Receiver<VoiceEvent>,
}

/// Main Bankline application
pub struct BanklineApp {
    state: AppState,
    theme: Theme,
    dashboard_tab: DashboardTab,
    initialized: bool,
}

impl BanklineApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: &AppConfig,
        session: SessionContext,
        capabilities: Capabilities,
        channels: AppChannels,
    ) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);

        let mut state = AppState::new(session, capabilities);
        state.speak_replies = config.speak_replies && capabilities.synthesis;
        state.record_duration = Duration::from_millis(config.voice.record_duration_ms);
        state.connect_chat(channels.chat_tx, channels.chat_rx);
        state.connect_voice(channels.voice_tx, channels.voice_rx);

        Self {
            state,
            theme,
            dashboard_tab: DashboardTab::Insights,
            initialized: false,
        }
    }

    /// One-time startup work on the first frame.
    fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.state.push_log("Bankline UI initialized".to_string());
        self.state.fetch_intents();
        self.initialized = true;
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(12.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("Bankline")
                            .size(20.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );

                    ui.label(
                        RichText::new("Banking Virtual Assistant")
                            .size(14.0)
                            .color(self.theme.text_muted),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("🗑").on_hover_text("Clear conversation").clicked() {
                            self.state.clear_conversation();
                        }

                        if ui.button("ℹ").on_hover_text("Toggle status panel").clicked() {
                            self.state.show_status_panel = !self.state.show_status_panel;
                        }

                        let dashboard_active = self.state.view == View::Dashboard;
                        if ui
                            .selectable_label(dashboard_active, "📊 Dashboard")
                            .clicked()
                        {
                            self.state.view = if dashboard_active {
                                View::Conversation
                            } else {
                                // Fetch on first open
                                if self.state.dashboard.is_none() {
                                    self.state.refresh_dashboard();
                                }
                                View::Dashboard
                            };
                        }
                    });
                });
            });
    }

    fn show_error_banner(&mut self, ctx: &egui::Context) {
        let Some(error) = self.state.error.clone() else {
            return;
        };

        TopBottomPanel::top("error_banner")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.error.gamma_multiply(0.2))
                    .inner_margin(8.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("⚠").color(self.theme.error));
                    ui.label(RichText::new(error).size(13.0).color(self.theme.error));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("✕").clicked() {
                            self.state.error = None;
                        }
                    });
                });
            });
    }

    fn show_status_panel(&mut self, ctx: &egui::Context) {
        if !self.state.show_status_panel {
            return;
        }

        SidePanel::right("status_panel")
            .resizable(true)
            .default_width(300.0)
            .min_width(250.0)
            .max_width(500.0)
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                StatusPanel::new(&self.state, &self.theme).show(ui);
            });
    }

    fn show_input_area(&mut self, ctx: &egui::Context) {
        if self.state.view != View::Conversation {
            return;
        }

        TopBottomPanel::bottom("input_area")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                InputBar::new(&mut self.state, &self.theme).show(ui);
            });
    }

    fn show_content(&mut self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_primary))
            .show(ctx, |ui| match self.state.view {
                View::Conversation => {
                    MessageList::new(&mut self.state, &self.theme).show(ui);
                }
                View::Dashboard => {
                    DashboardPanel::new(&mut self.state, &self.theme, &mut self.dashboard_tab)
                        .show(ui);
                }
            });
    }
}

impl eframe::App for BanklineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.initialize();

        // Drain pipeline events before rendering
        self.state.poll_events();

        self.show_header(ctx);
        self.show_error_banner(ctx);
        self.show_status_panel(ctx);
        self.show_input_area(ctx);
        self.show_content(ctx);

        // Keep polling while work is in flight
        if self.state.awaiting_reply()
            || self.state.dashboard_loading()
            || self.state.kb_searching()
            || self.state.voice_input != crate::ui::state::VoiceInputState::Idle
        {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // In-flight requests die with the pipeline runtimes
        self.state.shutdown_pipelines();
    }
}
