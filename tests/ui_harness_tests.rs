//! UI automation tests using egui_kittest and AccessKit
//!
//! Verify the rendered conversation by querying the accessibility tree.

#![cfg(feature = "ui-testing")]

use bankline::capability::Capabilities;
use bankline::chat::SessionContext;
use bankline::messages::Message;
use bankline::ui::state::AppState;
use egui_kittest::kittest::Queryable;
use egui_kittest::Harness;

fn render_conversation(state: &AppState, ui: &mut egui::Ui) {
    for message in state.conversation.get_all() {
        let label = if message.is_user() {
            format!("User message: {}", message.text)
        } else {
            format!("Assistant response: {}", message.text)
        };

        let response = ui.label(&message.text);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &label)
        });
    }
}

#[test]
fn conversation_renders_user_and_assistant_messages() {
    let state = AppState::new(SessionContext::new("demo_user"), Capabilities::none());
    state
        .conversation
        .add(Message::user("Check my account balance"));
    state
        .conversation
        .add(Message::assistant("Your current balance is £2,450.30."));

    let mut harness = Harness::new_ui(|ui| {
        render_conversation(&state, ui);
    });

    harness.run();

    harness.get_by_label("User message: Check my account balance");
    harness.get_by_label("Assistant response: Your current balance is £2,450.30.");
}
