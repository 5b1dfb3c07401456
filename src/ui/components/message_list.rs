//! Message list component
//!
//! Displays the conversation history: bubbles, timestamps, intent chips,
//! quick-reply suggestions, and a speak button on assistant messages.

use crate::messages::Message;
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, Align, Color32, RichText, Vec2};

/// Message list component
pub struct MessageList<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        let messages = self.state.conversation.get_all();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.add_space(self.theme.spacing);

                    for message in &messages {
                        self.show_message(ui, message);
                        ui.add_space(self.theme.spacing_sm);
                    }

                    if self.state.awaiting_reply() {
                        self.show_typing_indicator(ui);
                    }

                    ui.add_space(self.theme.spacing);
                });
            });
    }

    fn show_message(&mut self, ui: &mut egui::Ui, message: &Message) {
        let is_user = message.is_user();
        let bubble_color = if is_user {
            self.theme.user_bubble
        } else {
            self.theme.assistant_bubble
        };
        let text_color = if is_user {
            Color32::WHITE
        } else {
            self.theme.text_primary
        };

        let align = if is_user { Align::RIGHT } else { Align::LEFT };

        ui.with_layout(egui::Layout::top_down(align), |ui| {
            // Sender label
            ui.label(
                RichText::new(if is_user { "You" } else { "Assistant" })
                    .size(12.0)
                    .color(self.theme.text_muted),
            );

            ui.add_space(2.0);

            let max_width = ui.available_width() * 0.75;

            // Message bubble
            egui::Frame::none()
                .fill(bubble_color)
                .rounding(self.theme.bubble_rounding)
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    ui.set_max_width(max_width);
                    ui.label(RichText::new(&message.text).color(text_color));

                    if let (Some(intent), Some(confidence)) =
                        (&message.intent, message.confidence)
                    {
                        ui.add_space(4.0);
                        self.show_intent_chip(ui, intent, confidence);
                    }
                });

            // Speak button for assistant messages
            if !is_user && self.state.capabilities.synthesis {
                if ui
                    .small_button("🔊")
                    .on_hover_text("Read this message aloud")
                    .clicked()
                {
                    self.state.speak_text(&message.text);
                }
            }

            // Timestamp
            let time_str = message.timestamp.format("%H:%M").to_string();
            ui.label(
                RichText::new(time_str)
                    .size(10.0)
                    .color(self.theme.text_muted),
            );

            // Quick-reply suggestions
            if !message.suggestions.is_empty() {
                self.show_suggestions(ui, &message.suggestions);
            }
        });
    }

    fn show_intent_chip(&self, ui: &mut egui::Ui, intent: &str, confidence: f64) {
        let chip_color = self.theme.confidence_color(confidence);
        let label = format!("{} ({:.0}%)", intent, confidence * 100.0);

        egui::Frame::none()
            .fill(chip_color.gamma_multiply(0.25))
            .rounding(self.theme.button_rounding)
            .inner_margin(egui::Margin::symmetric(6.0, 2.0))
            .show(ui, |ui| {
                ui.label(RichText::new(label).size(11.0).color(chip_color));
            });
    }

    fn show_suggestions(&mut self, ui: &mut egui::Ui, suggestions: &[String]) {
        ui.add_space(4.0);
        ui.label(
            RichText::new("Quick suggestions:")
                .size(11.0)
                .color(self.theme.text_muted),
        );

        let mut clicked: Option<String> = None;
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing = Vec2::splat(4.0);
            for suggestion in suggestions {
                let chip = egui::Button::new(
                    RichText::new(suggestion)
                        .size(12.0)
                        .color(self.theme.text_secondary),
                )
                .fill(self.theme.bg_secondary)
                .rounding(self.theme.button_rounding);

                if ui.add(chip).clicked() {
                    clicked = Some(suggestion.clone());
                }
            }
        });

        if let Some(suggestion) = clicked {
            self.state.send_message(&suggestion);
        }
    }

    fn show_typing_indicator(&self, ui: &mut egui::Ui) {
        ui.with_layout(egui::Layout::top_down(Align::LEFT), |ui| {
            ui.label(
                RichText::new("Assistant")
                    .size(12.0)
                    .color(self.theme.text_muted),
            );

            egui::Frame::none()
                .fill(self.theme.assistant_bubble)
                .rounding(self.theme.bubble_rounding)
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        for i in 0..3 {
                            let t = ui.ctx().input(|input| input.time);
                            let alpha = ((t * 3.0 + i as f64 * 0.5).sin() * 0.5 + 0.5) as f32;
                            ui.label(
                                RichText::new("●")
                                    .size(10.0)
                                    .color(self.theme.text_muted.gamma_multiply(alpha)),
                            );
                        }
                        ui.label(
                            RichText::new("Assistant is typing...")
                                .size(12.0)
                                .color(self.theme.text_muted),
                        );
                    });
                });
        });

        ui.ctx().request_repaint();
    }
}
