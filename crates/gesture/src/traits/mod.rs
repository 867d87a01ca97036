use image::{GrayImage, RgbImage};
use rand::RngCore;

use crate::{error::Result, pipeline::Detection, types::Contour};

/// Trait for turning an ROI into a binary hand mask (foreground = 255)
pub trait Segmenter: Send + Sync {
    /// Segment the ROI. Randomised algorithms draw from `rng` only.
    fn segment(&self, roi: &RgbImage, rng: &mut dyn RngCore) -> Result<GrayImage>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Trait for picking the hand outline out of a binary mask
pub trait ContourExtractor: Send + Sync {
    /// Return the boundary with the largest enclosed area, or `NoContourFound`
    fn extract_largest(&self, mask: &GrayImage) -> Result<Contour>;
}

/// Caller-owned destination for rendered detections
pub trait FrameSink {
    /// Hand over one processed frame
    fn present(&mut self, frame_name: &str, detection: &Detection) -> Result<()>;
}
