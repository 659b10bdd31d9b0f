//! Turns the service's plot payload into something egui can draw.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use client_core::render::PlotSection;
use eframe::egui;
use shared::protocol::PlotImage;

#[derive(Clone)]
pub struct DecodedPlot {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

pub enum PlotDisplay {
    Texture(egui::TextureHandle),
    Link(String),
    Unavailable(String),
}

/// Keeps the texture for the plot currently on screen. A new payload replaces it.
#[derive(Default)]
pub struct PlotCache {
    current: Option<(PlotImage, PlotDisplay)>,
}

impl PlotCache {
    pub fn display_for(&mut self, ctx: &egui::Context, image: &PlotImage) -> &PlotDisplay {
        if !matches!(&self.current, Some((cached, _)) if cached == image) {
            self.current = None;
        }
        let (_, display) = self
            .current
            .get_or_insert_with(|| (image.clone(), build_display(ctx, image)));
        display
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

fn build_display(ctx: &egui::Context, image: &PlotImage) -> PlotDisplay {
    if !image.is_data_uri() {
        return PlotDisplay::Link(image.as_str().to_string());
    }

    match decode_data_uri(image.as_str()).and_then(|bytes| decode_plot_pixels(&bytes)) {
        Ok(decoded) => {
            let color_image = egui::ColorImage::from_rgba_unmultiplied(
                [decoded.width, decoded.height],
                &decoded.rgba,
            );
            PlotDisplay::Texture(ctx.load_texture(
                "income-plot",
                color_image,
                egui::TextureOptions::LINEAR,
            ))
        }
        Err(reason) => {
            tracing::warn!("failed to decode plot image: {reason}");
            PlotDisplay::Unavailable(reason)
        }
    }
}

/// Extracts the bytes of a `data:<mime>;base64,<payload>` URI.
pub fn decode_data_uri(source: &str) -> Result<Vec<u8>, String> {
    let rest = source
        .strip_prefix("data:")
        .ok_or_else(|| "not a data uri".to_string())?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| "data uri has no payload separator".to_string())?;
    if !header.to_ascii_lowercase().ends_with(";base64") {
        return Err(format!("unsupported data uri encoding '{header}'"));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|err| format!("invalid base64 plot payload: {err}"))
}

pub fn decode_plot_pixels(bytes: &[u8]) -> Result<DecodedPlot, String> {
    let decoded = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let rgba = decoded.to_rgba8();
    let width = rgba.width() as usize;
    let height = rgba.height() as usize;
    Ok(DecodedPlot {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

pub fn show_plot_section(ui: &mut egui::Ui, cache: &mut PlotCache, section: &PlotSection) {
    ui.heading(section.heading);
    ui.add_space(6.0);
    match cache.display_for(ui.ctx(), &section.image) {
        PlotDisplay::Texture(texture) => {
            let size = texture.size_vec2();
            let scale = (ui.available_width() / size.x).min(1.0);
            ui.add(egui::Image::new(texture).fit_to_exact_size(size * scale))
                .on_hover_text(section.alt);
        }
        PlotDisplay::Link(url) => {
            ui.hyperlink_to(section.alt, url);
        }
        PlotDisplay::Unavailable(reason) => {
            ui.label(
                egui::RichText::new(format!("Plot could not be displayed: {reason}"))
                    .color(ui.visuals().warn_fg_color),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_data_uri(width: u32, height: u32) -> String {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([70, 130, 180, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut out, image::ImageFormat::Png)
            .expect("encode png");
        format!("data:image/png;base64,{}", STANDARD.encode(out.into_inner()))
    }

    #[test]
    fn decodes_base64_png_data_uri() {
        let bytes = decode_data_uri(&png_data_uri(3, 2)).expect("data uri");
        let decoded = decode_plot_pixels(&bytes).expect("png");

        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.rgba.len(), 3 * 2 * 4);
        assert_eq!(&decoded.rgba[..4], &[70, 130, 180, 255]);
    }

    #[test]
    fn rejects_non_base64_data_uri() {
        let err = decode_data_uri("data:image/svg+xml,%3Csvg%3E").expect_err("percent encoded");
        assert!(err.contains("unsupported data uri encoding"));
    }

    #[test]
    fn rejects_garbage_payloads() {
        assert!(decode_data_uri("data:image/png;base64,@@@").is_err());
        assert!(decode_data_uri("https://example.test/plot.png").is_err());

        let bytes = decode_data_uri("data:image/png;base64,aGVsbG8=").expect("base64");
        assert!(decode_plot_pixels(&bytes).is_err());
    }
}
