use image::{imageops, GrayImage};
use tracing::debug;

use crate::{
    error::{GestureError, Result},
    traits::ContourExtractor,
    types::Contour,
};

/// Imageproc-based contour extractor keeping the largest-area boundary.
///
/// The mask is traced inside a one pixel background frame, so blobs touching
/// the mask edges are closed along those edges.
#[derive(Debug, Clone, Default)]
pub struct ImageprocContourExtractor;

fn pad_with_background(mask: &GrayImage) -> GrayImage {
    let mut padded = GrayImage::new(mask.width() + 2, mask.height() + 2);
    imageops::replace(&mut padded, mask, 1, 1);
    padded
}

impl ContourExtractor for ImageprocContourExtractor {
    fn extract_largest(&self, mask: &GrayImage) -> Result<Contour> {
        let contours = imageproc::contours::find_contours::<i32>(&pad_with_background(mask));
        let found = contours.len();

        let largest = contours
            .into_iter()
            .map(|contour| {
                Contour::new(contour.points.iter().map(|p| [p.x - 1, p.y - 1]).collect())
            })
            .filter(|contour| !contour.is_empty())
            .map(|contour| {
                let area = contour.area();
                (contour, area)
            })
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(contour, _)| contour)
            .ok_or(GestureError::NoContourFound)?;

        debug!(found, points = largest.len(), "extracted largest contour");
        Ok(largest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn fill(mask: &mut GrayImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) {
        for y in ys {
            for x in xs.clone() {
                mask.put_pixel(x, y, Luma([255u8]));
            }
        }
    }

    #[test]
    fn test_blank_mask_has_no_contour() {
        let mask = GrayImage::new(50, 50);
        let result = ImageprocContourExtractor.extract_largest(&mask);
        assert!(matches!(result, Err(GestureError::NoContourFound)));
    }

    #[test]
    fn test_largest_blob_wins() {
        let mut mask = GrayImage::new(100, 100);
        fill(&mut mask, 5..15, 5..15);
        fill(&mut mask, 40..90, 30..80);

        let contour = ImageprocContourExtractor
            .extract_largest(&mask)
            .expect("Should find a contour");

        assert!(contour.points.iter().all(|&[x, y]| x >= 40 && y >= 30));
        // Boundary pixel centers of a 50x50 block enclose 49x49
        assert!((contour.area() - 49.0 * 49.0).abs() < 1e-6);
    }

    #[test]
    fn test_full_mask_is_traced_along_its_edges() {
        let mut mask = GrayImage::new(200, 200);
        fill(&mut mask, 0..200, 0..200);

        let contour = ImageprocContourExtractor
            .extract_largest(&mask)
            .expect("A full mask still has a boundary");

        assert!(contour.points.iter().all(|&[x, y]| (0..200).contains(&x) && (0..200).contains(&y)));
        assert!((contour.area() - 199.0 * 199.0).abs() < 1e-6);
    }

    #[test]
    fn test_full_width_band_beats_small_blob() {
        let mut mask = GrayImage::new(200, 200);
        fill(&mut mask, 0..200, 80..160);
        fill(&mut mask, 20..30, 20..30);

        let contour = ImageprocContourExtractor
            .extract_largest(&mask)
            .expect("Should find the band");

        assert!(contour.points.iter().all(|&[_, y]| (80..160).contains(&y)));
        assert!((contour.area() - 199.0 * 79.0).abs() < 1e-6);
    }
}
