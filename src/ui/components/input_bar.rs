//! Input bar component
//!
//! Provides text input, the microphone button, and the send control.

use crate::ui::state::{AppState, VoiceInputState};
use crate::ui::theme::Theme;
use egui::{self, Key, RichText, Vec2};

/// Input bar component for text and voice input
pub struct InputBar<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> InputBar<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    self.show_mic_button(ui);
                    ui.add_space(self.theme.spacing_sm);
                    self.show_text_input(ui);
                    ui.add_space(self.theme.spacing_sm);
                    self.show_send_button(ui);
                });

                if self.state.voice_input != VoiceInputState::Idle {
                    ui.add_space(4.0);
                    let hint = match self.state.voice_input {
                        VoiceInputState::Listening => "Listening... Click mic to stop",
                        VoiceInputState::Recording => "Recording... Click mic to stop",
                        VoiceInputState::Idle => unreachable!(),
                    };
                    ui.vertical_centered(|ui| {
                        ui.label(
                            RichText::new(hint)
                                .size(12.0)
                                .color(self.theme.listening),
                        );
                    });
                }
            });
    }

    fn show_mic_button(&mut self, ui: &mut egui::Ui) {
        let active = self.state.voice_input != VoiceInputState::Idle;
        let voice_available = self.state.capabilities.voice_input();

        let (icon, tooltip) = if active {
            ("⏹", "Stop voice input")
        } else if self.state.capabilities.recognition {
            ("🎤", "Speak your message")
        } else if self.state.capabilities.capture {
            ("🎤", "Record a voice clip")
        } else {
            ("🎤", "Voice input unavailable")
        };

        let color = if active {
            self.theme.listening
        } else if voice_available {
            self.theme.text_secondary
        } else {
            self.theme.text_muted
        };

        let button = egui::Button::new(RichText::new(icon).size(20.0).color(color))
            .min_size(Vec2::splat(44.0))
            .rounding(self.theme.button_rounding);

        let button = if active {
            button.fill(self.theme.listening.gamma_multiply(0.2))
        } else {
            button
        };

        let enabled = voice_available && !self.state.awaiting_reply();
        let response = ui.add_enabled(enabled, button);
        let button_rect = response.rect;

        if response.clicked() {
            self.state.toggle_voice_input();
        }
        response.on_hover_text(tooltip);

        // Pulsing ring while voice input is active
        if active {
            let t = ui.ctx().input(|input| input.time);
            let pulse = ((t * 3.0).sin() * 0.5 + 0.5) as f32;

            let painter = ui.painter();
            let center = button_rect.center();
            let radius = button_rect.width() / 2.0 + 2.0 + pulse * 3.0;

            painter.circle_stroke(
                center,
                radius,
                egui::Stroke::new(
                    2.0 * pulse,
                    self.theme.listening.gamma_multiply(1.0 - pulse * 0.5),
                ),
            );

            ui.ctx().request_repaint();
        }
    }

    fn show_text_input(&mut self, ui: &mut egui::Ui) {
        let busy = self.state.awaiting_reply();
        let voice_active = self.state.voice_input != VoiceInputState::Idle;

        let available_width = ui.available_width() - 60.0;

        let text_edit = egui::TextEdit::singleline(&mut self.state.input_text)
            .hint_text("Type your message or ask about your account...")
            .desired_width(available_width)
            .font(egui::TextStyle::Body)
            .margin(egui::Margin::symmetric(12.0, 8.0));

        let response = ui.add_enabled(!busy && !voice_active, text_edit);

        if response.has_focus() && !self.state.input_text.trim().is_empty() {
            let enter_pressed = ui.input(|input| input.key_pressed(Key::Enter));
            let shift_held = ui.input(|input| input.modifiers.shift);

            if enter_pressed && !shift_held {
                self.state.send_input();
            }
        }
    }

    fn show_send_button(&mut self, ui: &mut egui::Ui) {
        let can_send = !self.state.input_text.trim().is_empty()
            && !self.state.awaiting_reply()
            && self.state.voice_input == VoiceInputState::Idle;

        let button_color = if can_send {
            self.theme.primary
        } else {
            self.theme.text_muted
        };

        let button = egui::Button::new(RichText::new("➤").size(18.0).color(egui::Color32::WHITE))
            .min_size(Vec2::splat(44.0))
            .rounding(self.theme.button_rounding)
            .fill(button_color);

        let response = ui.add_enabled(can_send, button);

        if response.clicked() {
            self.state.send_input();
        }

        response.on_hover_text("Send message (Enter)");
    }
}
