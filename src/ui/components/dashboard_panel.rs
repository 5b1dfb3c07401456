//! Analytics dashboard view
//!
//! Renders the read-only dashboard data: financial insights, spending
//! patterns, unread notifications, and a knowledge base search tab.

use crate::dashboard::{
    DashboardNotification, FinancialInsight, InsightPriority, SpendingPattern, SpendingTrend,
};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, Color32, RichText};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardTab {
    Insights,
    Spending,
    Notifications,
    Knowledge,
}

/// Dashboard panel component
pub struct DashboardPanel<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
    tab: &'a mut DashboardTab,
}

impl<'a> DashboardPanel<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme, tab: &'a mut DashboardTab) -> Self {
        Self { state, theme, tab }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        ui.add_space(self.theme.spacing_sm);

        ui.horizontal(|ui| {
            let unread = self
                .state
                .dashboard
                .as_ref()
                .map(|d| d.notifications.count)
                .unwrap_or(0);

            ui.selectable_value(self.tab, DashboardTab::Insights, "Insights");
            ui.selectable_value(self.tab, DashboardTab::Spending, "Spending");
            ui.selectable_value(
                self.tab,
                DashboardTab::Notifications,
                format!("Notifications ({})", unread),
            );
            ui.selectable_value(self.tab, DashboardTab::Knowledge, "Knowledge Base");

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(!self.state.dashboard_loading(), egui::Button::new("⟳"))
                    .on_hover_text("Refresh dashboard")
                    .clicked()
                {
                    self.state.refresh_dashboard();
                }

                if self.state.dashboard_loading() {
                    ui.spinner();
                }
            });
        });

        ui.separator();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match *self.tab {
                DashboardTab::Insights => self.show_insights(ui),
                DashboardTab::Spending => self.show_spending(ui),
                DashboardTab::Notifications => self.show_notifications(ui),
                DashboardTab::Knowledge => self.show_knowledge(ui),
            });
    }

    fn priority_color(&self, priority: InsightPriority) -> Color32 {
        match priority {
            InsightPriority::High => Color32::from_rgb(244, 67, 54),
            InsightPriority::Medium => Color32::from_rgb(255, 152, 0),
            InsightPriority::Low => Color32::from_rgb(76, 175, 80),
        }
    }

    fn trend_symbol(&self, trend: SpendingTrend) -> (&'static str, Color32) {
        match trend {
            SpendingTrend::Increasing => ("↗", Color32::from_rgb(244, 67, 54)),
            SpendingTrend::Decreasing => ("↘", Color32::from_rgb(76, 175, 80)),
            SpendingTrend::Stable => ("→", Color32::from_rgb(255, 152, 0)),
        }
    }

    fn show_empty_hint(&self, ui: &mut egui::Ui) {
        ui.add_space(self.theme.spacing_lg);
        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new("No dashboard data yet. Press ⟳ to refresh.")
                    .color(self.theme.text_muted),
            );
        });
    }

    fn show_insights(&mut self, ui: &mut egui::Ui) {
        let insights: Vec<FinancialInsight> = match &self.state.dashboard {
            Some(snapshot) if !snapshot.insights.is_empty() => snapshot.insights.clone(),
            _ => {
                self.show_empty_hint(ui);
                return;
            }
        };

        for insight in &insights {
            let accent = self.priority_color(insight.priority);

            egui::Frame::none()
                .fill(self.theme.bg_secondary)
                .rounding(self.theme.card_rounding)
                .inner_margin(self.theme.spacing)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(title_case(&insight.category))
                                .strong()
                                .color(self.theme.text_primary),
                        );
                        ui.with_layout(
                            egui::Layout::right_to_left(egui::Align::Center),
                            |ui| {
                                egui::Frame::none()
                                    .fill(accent)
                                    .rounding(self.theme.button_rounding)
                                    .inner_margin(egui::Margin::symmetric(6.0, 2.0))
                                    .show(ui, |ui| {
                                        ui.label(
                                            RichText::new(format!("{:?}", insight.priority))
                                                .size(11.0)
                                                .color(Color32::WHITE),
                                        );
                                    });
                            },
                        );
                    });

                    ui.add_space(4.0);
                    ui.label(
                        RichText::new(&insight.insight)
                            .size(13.0)
                            .color(self.theme.text_secondary),
                    );
                    ui.add_space(4.0);
                    ui.label(
                        RichText::new(&insight.recommendation)
                            .size(13.0)
                            .color(self.theme.text_primary),
                    );

                    if insight.impact.abs() > f64::EPSILON {
                        ui.add_space(4.0);
                        ui.label(
                            RichText::new(format!("Potential impact: £{:.2}", insight.impact))
                                .size(12.0)
                                .color(self.theme.text_muted),
                        );
                    }
                });

            ui.add_space(self.theme.spacing_sm);
        }
    }

    fn show_spending(&mut self, ui: &mut egui::Ui) {
        let patterns: Vec<SpendingPattern> = match &self.state.dashboard {
            Some(snapshot) if !snapshot.spending.is_empty() => snapshot.spending.clone(),
            _ => {
                self.show_empty_hint(ui);
                return;
            }
        };

        for pattern in &patterns {
            let (symbol, color) = self.trend_symbol(pattern.trend);

            egui::Frame::none()
                .fill(self.theme.bg_secondary)
                .rounding(self.theme.card_rounding)
                .inner_margin(self.theme.spacing)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(symbol).size(18.0).color(color));
                        ui.label(
                            RichText::new(title_case(&pattern.category))
                                .strong()
                                .color(self.theme.text_primary),
                        );
                        ui.with_layout(
                            egui::Layout::right_to_left(egui::Align::Center),
                            |ui| {
                                ui.label(
                                    RichText::new(format!("£{:.2}", pattern.amount))
                                        .color(self.theme.text_primary),
                                );
                            },
                        );
                    });

                    ui.add_space(4.0);
                    let fraction = (pattern.percentage / 100.0).clamp(0.0, 1.0) as f32;
                    ui.add(
                        egui::ProgressBar::new(fraction)
                            .text(format!("{:.1}% of spending", pattern.percentage)),
                    );
                });

            ui.add_space(self.theme.spacing_sm);
        }
    }

    fn show_notifications(&mut self, ui: &mut egui::Ui) {
        let notifications: Vec<DashboardNotification> = match &self.state.dashboard {
            Some(snapshot) if !snapshot.notifications.notifications.is_empty() => {
                snapshot.notifications.notifications.clone()
            }
            _ => {
                self.show_empty_hint(ui);
                return;
            }
        };

        for notification in &notifications {
            egui::Frame::none()
                .fill(self.theme.bg_secondary)
                .rounding(self.theme.card_rounding)
                .inner_margin(self.theme.spacing)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        if !notification.read {
                            ui.label(RichText::new("●").color(self.theme.primary));
                        }
                        ui.label(
                            RichText::new(&notification.title)
                                .strong()
                                .color(self.theme.text_primary),
                        );
                        ui.with_layout(
                            egui::Layout::right_to_left(egui::Align::Center),
                            |ui| {
                                ui.label(
                                    RichText::new(&notification.kind)
                                        .size(11.0)
                                        .color(self.theme.text_muted),
                                );
                            },
                        );
                    });
                    ui.label(
                        RichText::new(&notification.message)
                            .size(13.0)
                            .color(self.theme.text_secondary),
                    );
                });

            ui.add_space(self.theme.spacing_sm);
        }
    }

    fn show_knowledge(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.state.kb_query)
                    .hint_text("Search help articles...")
                    .desired_width(ui.available_width() - 100.0),
            );

            let submitted = response.lost_focus()
                && ui.input(|input| input.key_pressed(egui::Key::Enter));

            if ui
                .add_enabled(!self.state.kb_searching(), egui::Button::new("Search"))
                .clicked()
                || submitted
            {
                self.state.search_knowledge_base();
            }

            if self.state.kb_searching() {
                ui.spinner();
            }
        });

        ui.add_space(self.theme.spacing_sm);

        let results = self.state.kb_results.clone();
        if results.is_empty() {
            ui.label(
                RichText::new("Search the knowledge base for help with accounts, cards, and fees.")
                    .color(self.theme.text_muted),
            );
            return;
        }

        for article in &results {
            egui::Frame::none()
                .fill(self.theme.bg_secondary)
                .rounding(self.theme.card_rounding)
                .inner_margin(self.theme.spacing)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(&article.title)
                                .strong()
                                .color(self.theme.text_primary),
                        );
                        if let Some(score) = article.relevance_score {
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    ui.label(
                                        RichText::new(format!("{:.0}% match", score * 100.0))
                                            .size(11.0)
                                            .color(self.theme.text_muted),
                                    );
                                },
                            );
                        }
                    });
                    ui.label(
                        RichText::new(&article.content)
                            .size(13.0)
                            .color(self.theme.text_secondary),
                    );
                });

            ui.add_space(self.theme.spacing_sm);
        }
    }
}

fn title_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_capitalizes_first_letter() {
        assert_eq!(title_case("spending"), "Spending");
        assert_eq!(title_case(""), "");
    }
}
