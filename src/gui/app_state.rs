use deejfx::audio::AudioStream;
use deejfx::command::dispatch;
use deejfx::config::APP_VERSION;
use deejfx::{
    Actuator, CaptureError, CaptureLoop, CommandDispatcher, ControlSurface, MeterZone,
    SignalController, SignalDisplay, StopReason,
};
use eframe::egui;
use log::{debug, error, info};
use std::sync::Arc;

use super::components::{render_controls_panel, render_live_monitoring};
use crate::visual_engine::VisualEngine;

/// Meter side of the command stream.
#[derive(Default)]
struct MeterState {
    signal: i32,
    zone: MeterZone,
    last_stop: Option<StopReason>,
    session_over: bool,
}

impl SignalDisplay for MeterState {
    fn set_display_signal(&mut self, value: i32) {
        self.signal = value;
        self.zone = MeterZone::for_signal(value);
    }

    fn session_ended(&mut self, reason: &StopReason) {
        self.last_stop = Some(reason.clone());
        self.session_over = true;
    }
}

/// The target window is the only actuator; closed means none is bound.
fn bound_target(open: bool, engine: &mut VisualEngine) -> Option<&mut dyn Actuator> {
    if open { Some(engine) } else { None }
}

pub struct AppState {
    controls: Arc<ControlSurface>,
    capture: CaptureLoop,
    dispatcher: CommandDispatcher,
    preview: SignalController,
    audio_stream: Option<AudioStream>,
    meter: MeterState,
    start_error: Option<String>,
    visuals_window_open: bool,
    visuals_window: VisualEngine,
}

impl eframe::App for AppState {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_commands();
        self.render_top_panel(ctx);
        self.render_bottom_panel(ctx);
        self.render_central_panel(ctx);
        self.render_visualizer_window(ctx);

        ctx.request_repaint();
    }
}

impl AppState {
    pub fn new(
        controls: Arc<ControlSurface>,
        capture: CaptureLoop,
        dispatcher: CommandDispatcher,
    ) -> Self {
        debug!("Initializing GUI state...");
        let preview = SignalController::new(capture.config());

        Self {
            controls,
            capture,
            dispatcher,
            preview,
            audio_stream: None,
            meter: MeterState::default(),
            start_error: None,
            visuals_window_open: false,
            visuals_window: VisualEngine::new(),
        }
    }

    fn drain_commands(&mut self) {
        let actuator = bound_target(self.visuals_window_open, &mut self.visuals_window);
        self.dispatcher.dispatch_pending(&mut self.meter, actuator);

        if self.meter.session_over {
            self.meter.session_over = false;
            // a restart may already have replaced the session that ended
            if !self.capture.is_running() {
                self.capture.wait();
                self.audio_stream = None;
            }
        }
    }

    fn start_capture(&mut self) {
        let config = self.capture.config().clone();
        let mut opened = None;

        let result = self.capture.start(|| {
            let (stream, reader) = AudioStream::open(&config)
                .map_err(|err| CaptureError::SourceUnavailable(err.to_string()))?;
            opened = Some(stream);
            Ok(reader)
        });

        match result {
            Ok(()) => {
                if let Some(stream) = &opened {
                    info!("Capturing from {}", stream.device_name());
                }
                self.audio_stream = opened;
                self.start_error = None;
            }
            Err(err) => {
                error!("Could not start capture: {err}");
                self.start_error = Some(err.to_string());
            }
        }
    }

    fn stop_capture(&mut self) {
        self.capture.stop();
        self.audio_stream = None;
    }

    fn render_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.heading(format!("deejfx {APP_VERSION}"));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    match &self.audio_stream {
                        Some(stream) if self.capture.is_running() => {
                            ui.colored_label(egui::Color32::GREEN, "Listening")
                                .on_hover_text(stream.device_name());
                        }
                        _ => {
                            ui.colored_label(egui::Color32::GRAY, "Ready");
                        }
                    }
                });
            });
            if let Some(message) = &self.start_error {
                ui.colored_label(egui::Color32::RED, message);
            }
            ui.add_space(4.0);
        });
    }

    fn render_bottom_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                ui.add_space(4.0);
                ui.add_enabled_ui(!self.visuals_window_open, |ui| {
                    if ui.button("Open Target").clicked() {
                        self.visuals_window_open = true;
                        info!("Target window opened");
                    }
                });

                if self.visuals_window_open {
                    ui.colored_label(egui::Color32::GREEN, "● Target Active");
                } else {
                    ui.colored_label(egui::Color32::GRAY, "No target open");
                }
            });
            ui.add_space(8.0);
        });
    }

    fn render_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);

            render_live_monitoring(
                ui,
                self.meter.signal,
                self.capture.config().bar_max,
                self.meter.zone,
                self.meter.last_stop.as_ref(),
            );

            let running = self.capture.is_running();
            let response =
                render_controls_panel(ui, &self.controls, running, self.visuals_window_open);

            if response.start_stop_clicked {
                if running {
                    self.stop_capture();
                } else {
                    self.start_capture();
                }
            }

            // while idle, a channel switched on acts once on the signal still shown
            if !running {
                for channel in response.enabled {
                    if let Some(command) = self.preview.preview(channel, self.meter.signal) {
                        let actuator =
                            bound_target(self.visuals_window_open, &mut self.visuals_window);
                        dispatch(command, &mut self.meter, actuator);
                    }
                }
            }
        });
    }

    fn render_visualizer_window(&mut self, ctx: &egui::Context) {
        if self.visuals_window_open {
            let visualizer_id = egui::ViewportId::from_hash_of("deejfx_target");

            ctx.show_viewport_immediate(
                visualizer_id,
                egui::ViewportBuilder::default()
                    .with_title("deejfx target")
                    .with_inner_size([480.0, 480.0])
                    .with_resizable(true),
                |ctx, _class| {
                    if ctx.input(|i| i.viewport().close_requested()) {
                        self.visuals_window_open = false;
                        // nothing left to drive
                        self.controls.disable_all_channels();
                        info!("Target window closed, channels switched off");
                    }
                    self.visuals_window.render(ctx);
                },
            );
        }
    }
}
