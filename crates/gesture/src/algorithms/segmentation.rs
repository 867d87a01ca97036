use image::{GrayImage, Luma, RgbImage};
use rand::RngCore;
use tracing::debug;

use crate::{
    algorithms::kmeans::{kmeans, TermCriteria},
    error::Result,
    traits::Segmenter,
};

/// BT.601 luma with the fixed-point rounding used by common RGB->gray conversions.
pub fn luma_bt601(rgb: [u8; 3]) -> u8 {
    let [r, g, b] = rgb.map(u32::from);
    ((r * 4899 + g * 9617 + b * 1868 + 8192) >> 14) as u8
}

/// 8-bit HSV with hue halved into 0..=180.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(f32::from);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let saturation = if max > 0.0 { delta * 255.0 / max } else { 0.0 };
    let mut hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if hue < 0.0 {
        hue += 360.0;
    }

    [
        (hue / 2.0).round().min(180.0) as u8,
        saturation.round() as u8,
        max as u8,
    ]
}

/// Two-cluster colour segmentation.
///
/// Every pixel is replaced by the gray level of its cluster center; pixels
/// whose gray level lies strictly between 0 and `foreground_max_gray` become
/// foreground. Cluster order depends on the random source, so only the
/// resulting mask is meaningful.
#[derive(Debug, Clone)]
pub struct KMeansSegmenter {
    pub clusters: usize,
    pub criteria: TermCriteria,
    pub attempts: usize,
    pub foreground_max_gray: u8,
}

impl Default for KMeansSegmenter {
    fn default() -> Self {
        Self {
            clusters: 2,
            criteria: TermCriteria::default(),
            attempts: 10,
            foreground_max_gray: 150,
        }
    }
}

impl Segmenter for KMeansSegmenter {
    fn segment(&self, roi: &RgbImage, rng: &mut dyn RngCore) -> Result<GrayImage> {
        let samples: Vec<[f32; 3]> = roi
            .pixels()
            .map(|pixel| pixel.0.map(f32::from))
            .collect();

        let clustering = kmeans(&samples, self.clusters, self.criteria, self.attempts, rng)?;

        // Centers are truncated to 8 bits before the gray conversion
        let center_gray: Vec<u8> = clustering
            .centers
            .iter()
            .map(|center| luma_bt601(center.map(|channel| channel as u8)))
            .collect();
        debug!(?center_gray, compactness = clustering.compactness, "kmeans segmentation");

        let mut mask = GrayImage::new(roi.width(), roi.height());
        for (pixel, &label) in mask.pixels_mut().zip(&clustering.labels) {
            let gray = center_gray[label];
            let foreground = gray > 0 && gray < self.foreground_max_gray;
            *pixel = Luma([if foreground { 255 } else { 0 }]);
        }
        Ok(mask)
    }

    fn name(&self) -> &'static str {
        "kmeans"
    }
}

/// Skin segmentation by inclusive HSV bounds.
#[derive(Debug, Clone)]
pub struct ColorRangeSegmenter {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl Default for ColorRangeSegmenter {
    fn default() -> Self {
        Self {
            lower: [0, 50, 120],
            upper: [180, 150, 250],
        }
    }
}

impl Segmenter for ColorRangeSegmenter {
    fn segment(&self, roi: &RgbImage, _rng: &mut dyn RngCore) -> Result<GrayImage> {
        let mut mask = GrayImage::new(roi.width(), roi.height());
        for (target, source) in mask.pixels_mut().zip(roi.pixels()) {
            let hsv = rgb_to_hsv(source.0);
            let inside = (0..3).all(|c| self.lower[c] <= hsv[c] && hsv[c] <= self.upper[c]);
            *target = Luma([if inside { 255 } else { 0 }]);
        }
        Ok(mask)
    }

    fn name(&self) -> &'static str {
        "color_range"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use rand::{rngs::StdRng, SeedableRng};

    const SKIN: Rgb<u8> = Rgb([150, 100, 80]);
    const WALL: Rgb<u8> = Rgb([240, 240, 235]);

    fn create_test_roi() -> RgbImage {
        let mut roi = RgbImage::from_pixel(40, 40, WALL);
        for y in 10..30 {
            for x in 12..28 {
                roi.put_pixel(x, y, SKIN);
            }
        }
        roi
    }

    #[test]
    fn test_luma_matches_bt601() {
        assert_eq!(luma_bt601([0, 0, 0]), 0);
        assert_eq!(luma_bt601([255, 255, 255]), 255);
        assert_eq!(luma_bt601([255, 0, 0]), 76);
        assert_eq!(luma_bt601([0, 255, 0]), 150);
        assert_eq!(luma_bt601([0, 0, 255]), 29);
    }

    #[test]
    fn test_hsv_conversion() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), [0, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 255, 0]), [60, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 255]), [120, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 0]), [0, 0, 0]);
    }

    #[test]
    fn test_kmeans_segmenter_marks_dark_cluster_as_foreground() {
        let roi = create_test_roi();
        let mut rng = StdRng::seed_from_u64(3);
        let mask = KMeansSegmenter::default()
            .segment(&roi, &mut rng)
            .expect("Should segment");

        assert_eq!(mask.dimensions(), roi.dimensions());
        assert_eq!(mask.get_pixel(20, 20)[0], 255, "Skin pixel should be foreground");
        assert_eq!(mask.get_pixel(2, 2)[0], 0, "Wall pixel should be background");
        let foreground = mask.pixels().filter(|p| p[0] == 255).count();
        assert_eq!(foreground, 20 * 16);
    }

    #[test]
    fn test_kmeans_segmenter_is_reproducible_with_seed() {
        let mut roi = create_test_roi();
        for x in 0..40 {
            roi.put_pixel(x, 0, Rgb([(x * 6) as u8, 90, 60]));
        }
        let segmenter = KMeansSegmenter::default();
        let first = segmenter
            .segment(&roi, &mut StdRng::seed_from_u64(11))
            .expect("Should segment");
        let second = segmenter
            .segment(&roi, &mut StdRng::seed_from_u64(11))
            .expect("Should segment");
        assert_eq!(first, second);
    }

    #[test]
    fn test_uniform_roi_is_all_background() {
        let roi = RgbImage::from_pixel(16, 16, Rgb([0, 0, 0]));
        let mut rng = StdRng::seed_from_u64(5);
        let mask = KMeansSegmenter::default()
            .segment(&roi, &mut rng)
            .expect("Uniform ROI should still segment");
        assert!(mask.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_color_range_segmenter() {
        let roi = create_test_roi();
        let mut rng = StdRng::seed_from_u64(0);
        let mask = ColorRangeSegmenter::default()
            .segment(&roi, &mut rng)
            .expect("Should segment");
        assert_eq!(mask.get_pixel(20, 20)[0], 255);
        assert_eq!(mask.get_pixel(2, 2)[0], 0);
    }
}
