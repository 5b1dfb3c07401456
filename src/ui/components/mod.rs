pub mod dashboard_panel;
pub mod input_bar;
pub mod message_list;
pub mod status_panel;

pub use dashboard_panel::DashboardPanel;
pub use input_bar::InputBar;
pub use message_list::MessageList;
pub use status_panel::StatusPanel;
