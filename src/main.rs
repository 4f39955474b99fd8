mod gui;
mod visual_engine;

use deejfx::{CaptureLoop, CommandDispatcher, ControlSurface, PipelineConfig};
use log::{debug, info};
use std::sync::Arc;

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting up...");

    // === Shared State ===
    let config = PipelineConfig::default();
    let controls = Arc::new(ControlSurface::default());
    let (command_sender, dispatcher) = CommandDispatcher::channel();

    // === Capture Loop ===
    let capture = CaptureLoop::new(config, controls.clone(), vec![Box::new(command_sender)]);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([380.0, 560.0])
            .with_title("deejfx"),
        ..Default::default()
    };

    debug!("Launching GUI...");
    let result = eframe::run_native(
        "deejfx audio controller",
        options,
        Box::new(move |_cc| Ok(Box::new(gui::AppState::new(controls, capture, dispatcher)))),
    );

    info!("Clean shutdown complete");

    result
}
