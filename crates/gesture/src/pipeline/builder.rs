use rand::{rngs::StdRng, SeedableRng};

use crate::{
    algorithms::{AngleConversion, DefectAnalyzer, GestureClassifier, ImageprocContourExtractor, KMeansSegmenter},
    pipeline::GestureDetector,
    render::Compositor,
    traits::{ContourExtractor, Segmenter},
    types::{Roi, RoiPosition},
};

/// Builder for creating gesture detectors with a fluent API
pub struct GestureDetectorBuilder {
    roi: Roi,
    segmenter: Option<Box<dyn Segmenter>>,
    contour_extractor: Option<Box<dyn ContourExtractor>>,
    defect_analyzer: DefectAnalyzer,
    compositor: Compositor,
    seed: Option<u64>,
}

impl GestureDetectorBuilder {
    /// Create a new detector builder
    pub fn new() -> Self {
        Self {
            roi: RoiPosition::default().roi(),
            segmenter: None,
            contour_extractor: None,
            defect_analyzer: DefectAnalyzer::default(),
            compositor: Compositor::default(),
            seed: None,
        }
    }

    /// Use the fixed box for a named position
    pub fn roi_position(mut self, position: RoiPosition) -> Self {
        self.roi = position.roi();
        self
    }

    /// Use an explicit box instead of a named position
    pub fn roi(mut self, roi: Roi) -> Self {
        self.roi = roi;
        self
    }

    /// Set the segmenter (replaces any existing one)
    pub fn set_segmenter<S>(self, segmenter: S) -> Self
    where
        S: Segmenter + 'static,
    {
        self.set_boxed_segmenter(Box::new(segmenter))
    }

    pub fn set_boxed_segmenter(mut self, segmenter: Box<dyn Segmenter>) -> Self {
        self.segmenter = Some(segmenter);
        self
    }

    /// Set the contour extractor (replaces any existing one)
    pub fn set_contour_extractor<E>(mut self, extractor: E) -> Self
    where
        E: ContourExtractor + 'static,
    {
        self.contour_extractor = Some(Box::new(extractor));
        self
    }

    pub fn with_defect_analyzer(mut self, analyzer: DefectAnalyzer) -> Self {
        self.defect_analyzer = analyzer;
        self
    }

    pub fn with_angle_conversion(mut self, conversion: AngleConversion) -> Self {
        self.defect_analyzer.angle_conversion = conversion;
        self
    }

    pub fn with_compositor(mut self, compositor: Compositor) -> Self {
        self.compositor = compositor;
        self
    }

    /// Pin the segmenter's random source
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the detector with default components if not specified
    pub fn build(self) -> GestureDetector {
        let segmenter = self.segmenter
            .unwrap_or_else(|| Box::new(KMeansSegmenter::default()));

        let contour_extractor = self.contour_extractor
            .unwrap_or_else(|| Box::new(ImageprocContourExtractor));

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        GestureDetector::new(
            self.roi,
            segmenter,
            contour_extractor,
            self.defect_analyzer,
            GestureClassifier,
            self.compositor,
            rng,
        )
    }
}

impl Default for GestureDetectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
