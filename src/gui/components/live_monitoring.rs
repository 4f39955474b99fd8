use eframe::egui;

use deejfx::{MeterZone, StopReason};

pub fn render_live_monitoring(
    ui: &mut egui::Ui,
    signal: i32,
    bar_max: i32,
    zone: MeterZone,
    last_stop: Option<&StopReason>,
) {
    ui.label(egui::RichText::new("Live Monitoring").size(16.0));
    ui.add_space(8.0);

    render_meter(ui, signal, bar_max, zone);
    ui.add_space(4.0);

    ui.horizontal(|ui| {
        ui.label("Signal:");
        ui.strong(format!("{signal} / {bar_max}"));

        if let Some(reason) = last_stop {
            ui.separator();
            ui.label("Last session:");
            match reason {
                StopReason::Requested => ui.label("stopped"),
                StopReason::EndOfStream => ui.label("input closed"),
                StopReason::Stalled => {
                    ui.colored_label(egui::Color32::ORANGE, "input went silent")
                }
                StopReason::ReadFailed(details) => {
                    ui.colored_label(egui::Color32::RED, format!("failed: {details}"))
                }
            };
        }
    });
    ui.add_space(12.0);
}

fn zone_color(zone: MeterZone) -> egui::Color32 {
    match zone {
        MeterZone::Idle => egui::Color32::from_gray(90),
        MeterZone::Normal => egui::Color32::GREEN,
        MeterZone::Warm => egui::Color32::ORANGE,
        MeterZone::Hot => egui::Color32::RED,
    }
}

fn render_meter(ui: &mut egui::Ui, signal: i32, bar_max: i32, zone: MeterZone) {
    ui.group(|ui| {
        let desired_height = 28.0;
        let (response, painter) = ui.allocate_painter(
            egui::vec2(ui.available_width(), desired_height),
            egui::Sense::hover(),
        );

        let rect = response.rect;

        // Draw background
        painter.rect_filled(rect, 0.0, egui::Color32::from_gray(20));

        let fraction = if bar_max > 0 {
            (signal as f32 / bar_max as f32).clamp(0.0, 1.0)
        } else {
            0.0
        };

        if fraction > 0.0 {
            let mut filled = rect;
            filled.set_width(rect.width() * fraction);
            painter.rect_filled(filled, 0.0, zone_color(zone));
        }
    });
}
