//! # Hand Gesture Recognition
//!
//! Classifies a hand gesture (digits 0-5, "ok", "Fixe" or "reposition")
//! from a single video frame, looking only inside a fixed region of interest.
//!
//! ## Stages
//!
//! - **Segmentation**: two-cluster k-means over the ROI colours, thresholded on
//!   the cluster gray level into a binary hand mask
//! - **Contour extraction**: the largest-area boundary in the mask
//! - **Defect analysis**: polygon approximation, convex hull and convexity
//!   defects, keeping the narrow deep ones as finger gaps
//! - **Classification**: a fixed decision table over finger count and the
//!   hull/contour area ratio
//! - **Compositing**: ROI box, defect markers and label drawn over the frame,
//!   placed next to the mask
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gesture::{GestureDetector, RoiPosition};
//!
//! let mut detector = GestureDetector::builder()
//!     .roi_position(RoiPosition::Right)
//!     .with_seed(7)
//!     .build();
//!
//! let frame = image::open("frame.png")?.to_rgb8();
//! let detection = detector.detect(&frame, None)?;
//! if let Some(label) = detection.analysis.label() {
//!     println!("gesture: {label}");
//! }
//! detection.composite.save("annotated.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod config;
pub mod pipeline;
pub mod render;

pub use error::{GestureError, Result};
pub use types::{Contour, ContourAreas, GestureLabel, Roi, RoiPosition};
pub use traits::*;
pub use algorithms::*;
pub use config::{DetectorConfig, SegmentationConfig, KMeansConfig, ColorRangeConfig, DefectConfig};
pub use pipeline::{builder::GestureDetectorBuilder, Detection, FrameAnalysis, FrameSummary, GestureDetector};
pub use render::{bundled_font, load_font, Compositor};
pub use ab_glyph::FontArc;
