use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    algorithms::{AngleConversion, ColorRangeSegmenter, DefectAnalyzer, KMeansSegmenter, TermCriteria},
    error::{GestureError, Result},
    traits::Segmenter,
    types::RoiPosition,
};

/// Serializable detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DetectorConfig {
    /// `left` or `right`
    pub roi_position: String,
    /// Seed for the clustering random source; entropy when absent
    pub seed: Option<u64>,
    pub segmentation: SegmentationConfig,
    pub defects: DefectConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            roi_position: RoiPosition::Left.to_string(),
            seed: None,
            segmentation: SegmentationConfig::default(),
            defects: DefectConfig::default(),
        }
    }
}

impl DetectorConfig {
    /// Check every field, returning the parsed ROI position.
    pub fn validate(&self) -> Result<RoiPosition> {
        let position = RoiPosition::from_name(&self.roi_position)?;
        self.segmentation.validate()?;
        self.defects.validate()?;
        Ok(position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SegmentationConfig {
    Kmeans(KMeansConfig),
    ColorRange(ColorRangeConfig),
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self::Kmeans(KMeansConfig::default())
    }
}

impl SegmentationConfig {
    fn validate(&self) -> Result<()> {
        match self {
            Self::Kmeans(kmeans) => {
                if kmeans.clusters == 0 || kmeans.attempts == 0 {
                    return Err(GestureError::InvalidConfiguration(
                        "kmeans clusters and attempts must be at least 1".to_string(),
                    ));
                }
                if !kmeans.epsilon.is_finite() || kmeans.epsilon < 0.0 {
                    return Err(GestureError::InvalidConfiguration(format!(
                        "kmeans epsilon must be a non-negative number, got {}",
                        kmeans.epsilon
                    )));
                }
            }
            Self::ColorRange(range) => {
                if (0..3).any(|c| range.lower[c] > range.upper[c]) {
                    return Err(GestureError::InvalidConfiguration(format!(
                        "color range lower bound {:?} exceeds upper bound {:?}",
                        range.lower, range.upper
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn build(&self) -> Box<dyn Segmenter> {
        match self {
            Self::Kmeans(kmeans) => Box::new(KMeansSegmenter {
                clusters: kmeans.clusters,
                criteria: TermCriteria {
                    max_iterations: kmeans.max_iterations,
                    epsilon: kmeans.epsilon,
                },
                attempts: kmeans.attempts,
                foreground_max_gray: kmeans.foreground_max_gray,
            }),
            Self::ColorRange(range) => Box::new(ColorRangeSegmenter {
                lower: range.lower,
                upper: range.upper,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct KMeansConfig {
    pub clusters: usize,
    pub max_iterations: usize,
    pub epsilon: f32,
    pub attempts: usize,
    /// Cluster gray levels strictly between 0 and this value are foreground
    pub foreground_max_gray: u8,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        let segmenter = KMeansSegmenter::default();
        Self {
            clusters: segmenter.clusters,
            max_iterations: segmenter.criteria.max_iterations,
            epsilon: segmenter.criteria.epsilon,
            attempts: segmenter.attempts,
            foreground_max_gray: segmenter.foreground_max_gray,
        }
    }
}

/// Inclusive HSV bounds, hue in 0..=180
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ColorRangeConfig {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl Default for ColorRangeConfig {
    fn default() -> Self {
        let segmenter = ColorRangeSegmenter::default();
        Self {
            lower: segmenter.lower,
            upper: segmenter.upper,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DefectConfig {
    /// Polygon approximation tolerance as a fraction of the perimeter
    pub approximation_factor: f64,
    pub max_angle_degrees: f64,
    pub min_depth: f64,
    pub angle_conversion: AngleConversion,
}

impl Default for DefectConfig {
    fn default() -> Self {
        let analyzer = DefectAnalyzer::default();
        Self {
            approximation_factor: analyzer.approximation_factor,
            max_angle_degrees: analyzer.max_angle_degrees,
            min_depth: analyzer.min_depth,
            angle_conversion: analyzer.angle_conversion,
        }
    }
}

impl DefectConfig {
    fn validate(&self) -> Result<()> {
        let values = [
            ("approximation_factor", self.approximation_factor),
            ("max_angle_degrees", self.max_angle_degrees),
            ("min_depth", self.min_depth),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(GestureError::InvalidConfiguration(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn build(&self) -> DefectAnalyzer {
        DefectAnalyzer {
            approximation_factor: self.approximation_factor,
            max_angle_degrees: self.max_angle_degrees,
            min_depth: self.min_depth,
            angle_conversion: self.angle_conversion,
        }
    }
}
