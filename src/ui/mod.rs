pub mod components;
pub mod pane;

pub use components::{render_help_bar, render_mode_popup, render_popup, render_status_bar};
pub use pane::Pane;
