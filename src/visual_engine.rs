use deejfx::Actuator;
use deejfx::palette::{PalettePicker, palette_tint};
use eframe::egui;
use log::debug;

/// Preview target the rotation, contrast and palette commands land on.
pub struct VisualEngine {
    angle_deg: i32,
    contrast: f64,
    palette: &'static str,
    picker: PalettePicker,
}

impl VisualEngine {
    pub fn new() -> Self {
        Self {
            angle_deg: 0,
            contrast: 1.0,
            palette: "Fire",
            picker: PalettePicker::default(),
        }
    }

    fn fill_color(&self) -> egui::Color32 {
        let [r, g, b] = palette_tint(self.palette);
        let scale = |c: u8| (f64::from(c) * self.contrast).round().clamp(0.0, 255.0) as u8;
        egui::Color32::from_rgb(scale(r), scale(g), scale(b))
    }

    pub fn render(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(
                egui::Frame::default()
                    .fill(egui::Color32::BLACK)
                    .inner_margin(0.0),
            )
            .show(ctx, |ui| {
                let (response, painter) =
                    ui.allocate_painter(ui.available_size(), egui::Sense::hover());
                let rect = response.rect;
                let center = rect.center();
                let half = rect.width().min(rect.height()) * 0.3;
                let angle = (self.angle_deg as f32).to_radians();

                let corners: Vec<egui::Pos2> = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
                    .iter()
                    .map(|&(x, y)| {
                        let offset = egui::vec2(x * half, y * half);
                        let rotated = egui::vec2(
                            offset.x * angle.cos() - offset.y * angle.sin(),
                            offset.x * angle.sin() + offset.y * angle.cos(),
                        );
                        center + rotated
                    })
                    .collect();

                painter.add(egui::Shape::convex_polygon(
                    corners,
                    self.fill_color(),
                    egui::Stroke::NONE,
                ));

                painter.text(
                    rect.left_bottom() + egui::vec2(8.0, -8.0),
                    egui::Align2::LEFT_BOTTOM,
                    format!(
                        "{}°  contrast {:.2}  {}",
                        self.angle_deg, self.contrast, self.palette
                    ),
                    egui::FontId::monospace(14.0),
                    egui::Color32::WHITE,
                );
            });

        ctx.request_repaint();
    }
}

impl Actuator for VisualEngine {
    fn apply_rotation(&mut self, degrees: i32) {
        self.angle_deg = (self.angle_deg + degrees).rem_euclid(360);
    }

    fn apply_contrast(&mut self, multiplier: f64) {
        self.contrast = multiplier.clamp(0.0, 1.0);
    }

    fn trigger_palette_change(&mut self) {
        self.palette = self.picker.pick();
        debug!("Palette changed to {}", self.palette);
    }
}
