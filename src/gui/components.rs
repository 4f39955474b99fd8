mod controls_panel;
mod live_monitoring;

pub use controls_panel::{ControlsResponse, render_controls_panel};
pub use live_monitoring::render_live_monitoring;
