pub mod builder;

use ab_glyph::FontArc;
use image::{imageops, GrayImage, RgbImage};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    algorithms::{annotate_defects, DefectAnalyzer, DefectReport, GestureClassifier, GestureReading},
    config::DetectorConfig,
    error::{GestureError, Result},
    render::Compositor,
    traits::{ContourExtractor, FrameSink, Segmenter},
    types::{Contour, GestureLabel, Roi},
};

/// Per-frame gesture recognition: crop, segment, outline, count gaps, classify.
///
/// Frames are independent; the only state kept between calls is the ROI and
/// the random source used by the segmenter.
pub struct GestureDetector {
    roi: Roi,
    segmenter: Box<dyn Segmenter>,
    contour_extractor: Box<dyn ContourExtractor>,
    defect_analyzer: DefectAnalyzer,
    classifier: GestureClassifier,
    compositor: Compositor,
    rng: StdRng,
}

/// What one frame yielded. Stages after a missing contour are `None`.
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    pub roi: Roi,
    pub mask: GrayImage,
    pub contour: Option<Contour>,
    pub defects: Option<DefectReport>,
    pub reading: Option<GestureReading>,
}

impl FrameAnalysis {
    pub fn label(&self) -> Option<GestureLabel> {
        self.reading.map(|reading| reading.label)
    }

    pub fn summary(&self) -> FrameSummary {
        FrameSummary {
            label: self.label().map(|label| label.text().to_string()),
            finger_count: self.reading.map(|reading| reading.finger_count),
            finger_gaps: self.defects.as_ref().map(DefectReport::finger_gaps),
            defects: self.defects.as_ref().map(|report| report.defects.len()),
            degenerate_defects: self.defects.as_ref().map(DefectReport::degenerate),
            contour_area: self.reading.map(|reading| reading.areas.contour_area),
            hull_area: self.reading.map(|reading| reading.areas.hull_area),
            area_ratio: self.reading.map(|reading| reading.areas.area_ratio),
        }
    }
}

/// Flat, serializable digest of a `FrameAnalysis`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSummary {
    pub label: Option<String>,
    pub finger_count: Option<u32>,
    pub finger_gaps: Option<usize>,
    pub defects: Option<usize>,
    pub degenerate_defects: Option<usize>,
    pub contour_area: Option<f64>,
    pub hull_area: Option<f64>,
    pub area_ratio: Option<f64>,
}

/// Analysis plus the rendered side-by-side image
#[derive(Debug, Clone)]
pub struct Detection {
    pub analysis: FrameAnalysis,
    pub composite: RgbImage,
}

impl GestureDetector {
    /// Create a new detector builder
    pub fn builder() -> builder::GestureDetectorBuilder {
        builder::GestureDetectorBuilder::new()
    }

    pub fn new(
        roi: Roi,
        segmenter: Box<dyn Segmenter>,
        contour_extractor: Box<dyn ContourExtractor>,
        defect_analyzer: DefectAnalyzer,
        classifier: GestureClassifier,
        compositor: Compositor,
        rng: StdRng,
    ) -> Self {
        Self {
            roi,
            segmenter,
            contour_extractor,
            defect_analyzer,
            classifier,
            compositor,
            rng,
        }
    }

    /// Validate `config` and build a detector from it.
    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        let position = config.validate()?;
        let mut builder = Self::builder()
            .roi_position(position)
            .set_boxed_segmenter(config.segmentation.build())
            .with_defect_analyzer(config.defects.build());
        if let Some(seed) = config.seed {
            builder = builder.with_seed(seed);
        }
        Ok(builder.build())
    }

    pub fn roi(&self) -> Roi {
        self.roi
    }

    /// Run the recognition stages on one frame.
    ///
    /// A mask without any blob is not an error: the analysis comes back with
    /// the mask only.
    pub fn analyze(&mut self, frame: &RgbImage) -> Result<FrameAnalysis> {
        let roi = self.roi;
        roi.ensure_fits(frame.width(), frame.height())?;

        let roi_image = imageops::crop_imm(frame, roi.left, roi.top, roi.width, roi.height).to_image();
        let mask = self.segmenter.segment(&roi_image, &mut self.rng)?;

        let contour = match self.contour_extractor.extract_largest(&mask) {
            Ok(contour) => contour,
            Err(GestureError::NoContourFound) => {
                debug!(segmenter = self.segmenter.name(), "no hand in ROI");
                return Ok(FrameAnalysis {
                    roi,
                    mask,
                    contour: None,
                    defects: None,
                    reading: None,
                });
            }
            Err(err) => return Err(err),
        };

        let defects = self.defect_analyzer.analyze(&contour);
        let finger_count = defects.finger_gaps() as u32 + 1;
        let reading = self.classifier.classify(&contour, finger_count);
        debug!(
            label = %reading.label,
            finger_count,
            area_ratio = reading.areas.area_ratio,
            "classified frame"
        );

        Ok(FrameAnalysis {
            roi,
            mask,
            contour: Some(contour),
            defects: Some(defects),
            reading: Some(reading),
        })
    }

    /// Draw the ROI box, defect markers and label onto a copy of `frame`
    /// and compose it with the mask. Without `font` the compositor's own is used.
    pub fn render(&self, frame: &RgbImage, analysis: &FrameAnalysis, font: Option<&FontArc>) -> RgbImage {
        let mut annotated = frame.clone();
        self.compositor.draw_roi(&mut annotated, &analysis.roi);

        if let Some(defects) = &analysis.defects {
            annotate_defects(&mut annotated, defects, (analysis.roi.left as i32, analysis.roi.top as i32));
        }
        let font = font.or(self.compositor.font.as_ref());
        if let (Some(label), Some(font)) = (analysis.label(), font) {
            self.compositor.draw_label(&mut annotated, label, font);
        }

        self.compositor.compose(&annotated, &analysis.mask)
    }

    /// Analyze and render one frame.
    pub fn detect(&mut self, frame: &RgbImage, font: Option<&FontArc>) -> Result<Detection> {
        let analysis = self.analyze(frame)?;
        let composite = self.render(frame, &analysis, font);
        Ok(Detection { analysis, composite })
    }

    /// Detect and hand the result to `sink`.
    pub fn detect_into(
        &mut self,
        frame_name: &str,
        frame: &RgbImage,
        font: Option<&FontArc>,
        sink: &mut dyn FrameSink,
    ) -> Result<Option<GestureLabel>> {
        let detection = self.detect(frame, font)?;
        sink.present(frame_name, &detection)?;
        Ok(detection.analysis.label())
    }

    /// Get information about the detector configuration
    pub fn info(&self) -> String {
        format!(
            "GestureDetector: roi {}x{} at ({}, {}), {} segmentation, angle conversion {}",
            self.roi.width,
            self.roi.height,
            self.roi.left,
            self.roi.top,
            self.segmenter.name(),
            self.defect_analyzer.angle_conversion
        )
    }
}
