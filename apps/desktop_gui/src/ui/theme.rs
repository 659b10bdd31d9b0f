use eframe::egui;

pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(70, 130, 180);
pub const CARD_FILL: egui::Color32 = egui::Color32::from_rgb(40, 44, 52);
pub const CARD_STROKE: egui::Color32 = egui::Color32::from_rgb(62, 68, 81);
pub const ERROR_FILL: egui::Color32 = egui::Color32::from_rgb(111, 53, 53);
pub const ERROR_STROKE: egui::Color32 = egui::Color32::from_rgb(175, 96, 96);

pub fn visuals() -> egui::Visuals {
    let mut visuals = egui::Visuals::dark();
    visuals.hyperlink_color = ACCENT;
    visuals.selection.bg_fill = ACCENT;
    visuals
}

pub fn card_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(CARD_FILL)
        .stroke(egui::Stroke::new(1.0, CARD_STROKE))
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(12, 10))
}

pub fn banner_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(ERROR_FILL)
        .stroke(egui::Stroke::new(1.0, ERROR_STROKE))
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 8))
}
