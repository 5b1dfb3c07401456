//! Status panel component
//!
//! Side panel showing session identity, probed capabilities, the intents
//! the backend supports, and recent activity.

use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, RichText, ScrollArea};

/// Status panel component
pub struct StatusPanel<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> StatusPanel<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.label(
                        RichText::new("Session")
                            .strong()
                            .color(self.theme.text_primary),
                    );
                    ui.separator();

                    egui::Grid::new("session_stats")
                        .num_columns(2)
                        .spacing([20.0, 4.0])
                        .show(ui, |ui| {
                            self.stat_row(ui, "Session", &self.state.session.session_id);
                            self.stat_row(ui, "User", &self.state.session.user_id);
                            self.stat_row(
                                ui,
                                "Messages",
                                &self.state.conversation.len().to_string(),
                            );
                            self.stat_row(
                                ui,
                                "Recognition",
                                flag(self.state.capabilities.recognition),
                            );
                            self.stat_row(
                                ui,
                                "Synthesis",
                                flag(self.state.capabilities.synthesis),
                            );
                            self.stat_row(ui, "Microphone", flag(self.state.capabilities.capture));
                        });

                    if !self.state.intents.is_empty() {
                        ui.add_space(self.theme.spacing_sm);
                        ui.label(
                            RichText::new("Supported intents")
                                .strong()
                                .color(self.theme.text_primary),
                        );
                        ui.separator();
                        for intent in &self.state.intents {
                            ui.label(
                                RichText::new(format!("• {}", intent.name))
                                    .size(12.0)
                                    .color(self.theme.text_secondary),
                            );
                        }
                    }

                    ui.add_space(self.theme.spacing_sm);
                    ui.label(
                        RichText::new("Activity")
                            .strong()
                            .color(self.theme.text_primary),
                    );
                    ui.separator();

                    ScrollArea::vertical()
                        .id_salt("activity_log")
                        .auto_shrink([false, true])
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for line in &self.state.activity_log {
                                ui.label(
                                    RichText::new(line)
                                        .size(11.0)
                                        .family(egui::FontFamily::Monospace)
                                        .color(self.theme.text_muted),
                                );
                            }
                        });
                });
            });
    }

    fn stat_row(&self, ui: &mut egui::Ui, label: &str, value: &str) {
        ui.label(
            RichText::new(label)
                .size(12.0)
                .color(self.theme.text_muted),
        );
        ui.label(
            RichText::new(value)
                .size(12.0)
                .family(egui::FontFamily::Monospace)
                .color(self.theme.text_secondary),
        );
        ui.end_row();
    }
}

fn flag(enabled: bool) -> &'static str {
    if enabled {
        "available"
    } else {
        "unavailable"
    }
}
