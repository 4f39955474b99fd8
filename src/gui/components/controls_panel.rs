use eframe::egui;

use deejfx::consts::{SENSITIVITY_MAX, SENSITIVITY_MIN};
use deejfx::{Channel, ControlSurface};

#[derive(Default)]
pub struct ControlsResponse {
    pub start_stop_clicked: bool,
    /// Channels switched on this frame.
    pub enabled: Vec<Channel>,
}

pub fn render_controls_panel(
    ui: &mut egui::Ui,
    controls: &ControlSurface,
    running: bool,
    target_bound: bool,
) -> ControlsResponse {
    let mut response = ControlsResponse::default();

    ui.label(egui::RichText::new("Controls").size(16.0));
    ui.add_space(8.0);

    let label = if running { "■ Stop" } else { "▶ Start" };
    if ui
        .add_sized([120.0, 32.0], egui::Button::new(label))
        .clicked()
    {
        response.start_stop_clicked = true;
    }

    ui.add_space(8.0);
    ui.add_enabled_ui(target_bound, |ui| {
        render_channel_toggles(ui, controls, &mut response);
    })
    .response
    .on_disabled_hover_text("Open the target to drive it");

    ui.add_space(8.0);
    render_sensitivity(ui, controls);

    response
}

fn render_channel_toggles(
    ui: &mut egui::Ui,
    controls: &ControlSurface,
    response: &mut ControlsResponse,
) {
    ui.horizontal(|ui| {
        for channel in Channel::ALL {
            let mut enabled = controls.is_channel_enabled(channel);
            if ui.toggle_value(&mut enabled, channel.label()).changed() {
                controls.set_channel_enabled(channel, enabled);
                if enabled {
                    response.enabled.push(channel);
                }
            }
        }
    });
}

fn render_sensitivity(ui: &mut egui::Ui, controls: &ControlSurface) {
    egui::Grid::new("sensitivity_grid")
        .num_columns(2)
        .spacing([20.0, 8.0])
        .show(ui, |ui| {
            ui.label("Sensitivity:")
                .on_hover_text("Percent gain on the input level; scroll to step by 100");

            let mut sensitivity = controls.sensitivity();
            let slider = ui.add(egui::Slider::new(
                &mut sensitivity,
                SENSITIVITY_MIN..=SENSITIVITY_MAX,
            ));
            if slider.changed() {
                controls.set_sensitivity(sensitivity);
            }

            if slider.hovered() {
                let scroll = ui.input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0 {
                    controls.nudge_sensitivity(scroll.signum() as i32);
                }
            }
            ui.end_row();
        });
}
