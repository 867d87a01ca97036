use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::{imageops, DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use tracing::warn;

use crate::{
    error::{GestureError, Result},
    types::{GestureLabel, Roi},
};

/// DejaVu Sans, see `assets/DejaVuSans-LICENSE.txt`
const BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Load a TrueType/OpenType font for the label overlay.
pub fn load_font<P: AsRef<Path>>(path: P) -> Result<FontArc> {
    let bytes = std::fs::read(path)?;
    FontArc::try_from_vec(bytes).map_err(|e| GestureError::Font(e.to_string()))
}

/// The label font shipped with the crate.
pub fn bundled_font() -> Result<FontArc> {
    FontArc::try_from_slice(BUNDLED_FONT).map_err(|e| GestureError::Font(e.to_string()))
}

/// Draws the overlays onto the frame and lays frame and mask side by side.
#[derive(Debug, Clone)]
pub struct Compositor {
    /// Top-left corner of the label text
    pub label_origin: (i32, i32),
    pub label_scale: f32,
    pub label_color: Rgb<u8>,
    pub roi_color: Rgb<u8>,
    /// Used when the caller does not pass a font of its own
    pub font: Option<FontArc>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self {
            label_origin: (0, 8),
            label_scale: 48.0,
            label_color: Rgb([255, 0, 0]),
            roi_color: Rgb([0, 255, 0]),
            font: bundled_font()
                .map_err(|err| warn!(%err, "bundled label font unusable"))
                .ok(),
        }
    }
}

impl Compositor {
    pub fn draw_roi(&self, frame: &mut RgbImage, roi: &Roi) {
        draw_hollow_rect_mut(frame, roi.to_rect(), self.roi_color);
    }

    pub fn draw_label(&self, frame: &mut RgbImage, label: GestureLabel, font: &FontArc) {
        let (x, y) = self.label_origin;
        draw_text_mut(
            frame,
            self.label_color,
            x,
            y,
            PxScale::from(self.label_scale),
            font,
            label.text(),
        );
    }

    /// Frame on the left, mask stretched to the frame height on the right.
    pub fn compose(&self, frame: &RgbImage, mask: &GrayImage) -> RgbImage {
        let height = frame.height();
        let stretched = imageops::resize(mask, mask.width(), height, imageops::FilterType::Triangle);
        let mask_rgb = DynamicImage::ImageLuma8(stretched).to_rgb8();

        let mut composite = RgbImage::new(frame.width() + mask_rgb.width(), height);
        imageops::replace(&mut composite, frame, 0, 0);
        imageops::replace(&mut composite, &mask_rgb, frame.width() as i64, 0);
        composite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_compose_places_mask_right_of_frame() {
        let frame = RgbImage::from_pixel(64, 48, Rgb([10, 20, 30]));
        let mask = GrayImage::from_pixel(20, 20, Luma([255u8]));

        let composite = Compositor::default().compose(&frame, &mask);

        assert_eq!(composite.dimensions(), (84, 48));
        assert_eq!(*composite.get_pixel(5, 5), Rgb([10, 20, 30]));
        assert_eq!(*composite.get_pixel(70, 40), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_draw_roi_outline() {
        let mut frame = RgbImage::new(100, 100);
        let roi = Roi { left: 10, top: 20, width: 30, height: 30 };
        let compositor = Compositor::default();
        compositor.draw_roi(&mut frame, &roi);

        assert_eq!(*frame.get_pixel(10, 20), compositor.roi_color);
        assert_eq!(*frame.get_pixel(39, 49), compositor.roi_color);
        assert_eq!(*frame.get_pixel(25, 35), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draw_label_paints_label_color() {
        let compositor = Compositor::default();
        let font = compositor.font.clone().expect("Bundled font should parse");
        let mut frame = RgbImage::from_pixel(120, 80, Rgb([235, 235, 230]));

        compositor.draw_label(&mut frame, GestureLabel::Five, &font);

        let painted = frame
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] > 200 && p[1] < 60 && p[2] < 60)
            .collect::<Vec<_>>();
        assert!(!painted.is_empty());
        assert!(painted.iter().all(|&(x, y, _)| x < 60 && (8..70).contains(&y)));
    }

    #[test]
    fn test_missing_font_file_is_io_error() {
        let result = load_font("/definitely/not/a/font.ttf");
        assert!(matches!(result, Err(GestureError::Io(_))));
    }
}
