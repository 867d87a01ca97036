use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, warn};

use crate::{
    algorithms::{
        hull::{convex_hull_indices, convexity_defects},
        simplification::{approximate_polygon, approximation_epsilon},
    },
    error::{GestureError, Result},
    types::Contour,
};

const GAP_LINE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const FAR_POINT_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const FAR_POINT_RADIUS: i32 = 3;

/// How the inverse cosine result is turned into degrees.
///
/// `Approximate` multiplies by 57, which the angle threshold was tuned against.
#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString,
    PartialEq, Eq, Default
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AngleConversion {
    #[default]
    Approximate,
    Exact,
}

impl AngleConversion {
    pub fn degrees_per_radian(self) -> f64 {
        match self {
            Self::Approximate => 57.0,
            Self::Exact => 180.0 / std::f64::consts::PI,
        }
    }
}

/// Triangle spanned by a defect's start, end and far points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapTriangle {
    /// |end - start|
    pub a: f64,
    /// |far - start|
    pub b: f64,
    /// |end - far|
    pub c: f64,
    pub area: f64,
    /// Height from `far` onto the start-end line
    pub depth: f64,
    /// Interior angle at `far`, in (possibly approximate) degrees
    pub angle: f64,
}

fn distance(p: [i32; 2], q: [i32; 2]) -> f64 {
    let dx = (q[0] - p[0]) as f64;
    let dy = (q[1] - p[1]) as f64;
    dx.hypot(dy)
}

impl GapTriangle {
    pub fn measure(start: [i32; 2], end: [i32; 2], far: [i32; 2], degrees_per_radian: f64) -> Result<Self> {
        let a = distance(start, end);
        let b = distance(start, far);
        let c = distance(far, end);

        if a == 0.0 {
            return Err(GestureError::DegenerateGeometry(format!(
                "start {start:?} and end {end:?} coincide"
            )));
        }
        if b * c == 0.0 {
            return Err(GestureError::DegenerateGeometry(format!(
                "far point {far:?} coincides with a hull vertex"
            )));
        }

        let s = (a + b + c) / 2.0;
        let area = (s * (s - a) * (s - b) * (s - c)).max(0.0).sqrt();
        let depth = 2.0 * area / a;

        let cosine = (b * b + c * c - a * a) / (2.0 * b * c);
        if !cosine.is_finite() || cosine.abs() > 1.0 + 1e-9 {
            return Err(GestureError::DegenerateGeometry(format!(
                "law of cosines argument {cosine} out of range"
            )));
        }
        let angle = cosine.clamp(-1.0, 1.0).acos() * degrees_per_radian;

        Ok(Self { a, b, c, area, depth, angle })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum DefectVerdict {
    /// Narrow and deep enough to be the web between two fingers
    FingerGap,
    Rejected,
    Degenerate(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasuredDefect {
    pub start: [i32; 2],
    pub end: [i32; 2],
    pub far: [i32; 2],
    /// Distance of `far` from the hull edge as reported by the defect search
    pub hull_depth: f64,
    pub triangle: Option<GapTriangle>,
    pub verdict: DefectVerdict,
}

impl MeasuredDefect {
    pub fn is_finger_gap(&self) -> bool {
        self.verdict == DefectVerdict::FingerGap
    }
}

/// Everything the defect analysis derived from one contour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectReport {
    pub polygon: Contour,
    pub hull: Vec<usize>,
    pub defects: Vec<MeasuredDefect>,
}

impl DefectReport {
    pub fn finger_gaps(&self) -> usize {
        self.defects.iter().filter(|d| d.is_finger_gap()).count()
    }

    pub fn degenerate(&self) -> usize {
        self.defects
            .iter()
            .filter(|d| matches!(d.verdict, DefectVerdict::Degenerate(_)))
            .count()
    }
}

/// Counts finger gaps from the convexity defects of a hand contour.
#[derive(Debug, Clone)]
pub struct DefectAnalyzer {
    /// Polygon approximation tolerance as a fraction of the contour perimeter
    pub approximation_factor: f64,
    pub max_angle_degrees: f64,
    /// Minimum triangle height, in ROI pixels
    pub min_depth: f64,
    pub angle_conversion: AngleConversion,
}

impl Default for DefectAnalyzer {
    fn default() -> Self {
        Self {
            approximation_factor: 0.0005,
            max_angle_degrees: 90.0,
            min_depth: 30.0,
            angle_conversion: AngleConversion::Approximate,
        }
    }
}

impl DefectAnalyzer {
    pub fn analyze(&self, contour: &Contour) -> DefectReport {
        let epsilon = approximation_epsilon(contour, self.approximation_factor);
        let polygon = approximate_polygon(contour, epsilon);
        let hull = convex_hull_indices(&polygon);
        let degrees_per_radian = self.angle_conversion.degrees_per_radian();

        let defects: Vec<MeasuredDefect> = convexity_defects(&polygon, &hull)
            .into_iter()
            .map(|defect| {
                let start = polygon.points[defect.start_index];
                let end = polygon.points[defect.end_index];
                let far = polygon.points[defect.far_index];

                let (triangle, verdict) = match GapTriangle::measure(start, end, far, degrees_per_radian) {
                    Ok(triangle) => {
                        let verdict = if self.is_finger_gap(&triangle) {
                            DefectVerdict::FingerGap
                        } else {
                            DefectVerdict::Rejected
                        };
                        (Some(triangle), verdict)
                    }
                    Err(err) => {
                        warn!(%err, ?far, "skipping defect");
                        (None, DefectVerdict::Degenerate(err.to_string()))
                    }
                };

                MeasuredDefect {
                    start,
                    end,
                    far,
                    hull_depth: defect.depth,
                    triangle,
                    verdict,
                }
            })
            .collect();

        let report = DefectReport { polygon, hull, defects };
        debug!(
            epsilon,
            vertices = report.polygon.len(),
            defects = report.defects.len(),
            finger_gaps = report.finger_gaps(),
            "analyzed convexity defects"
        );
        report
    }

    fn is_finger_gap(&self, triangle: &GapTriangle) -> bool {
        (0.0..=self.max_angle_degrees).contains(&triangle.angle) && triangle.depth > self.min_depth
    }

    /// Analyze `contour` and draw the defect markers straight onto `roi`.
    pub fn count_finger_gaps(&self, contour: &Contour, roi: &mut RgbImage) -> usize {
        let report = self.analyze(contour);
        annotate_defects(roi, &report, (0, 0));
        report.finger_gaps()
    }
}

fn draw_thick_line(canvas: &mut RgbImage, from: (f32, f32), to: (f32, f32), color: Rgb<u8>) {
    draw_line_segment_mut(canvas, from, to, color);
    let shift = if (to.0 - from.0).abs() >= (to.1 - from.1).abs() { (0.0, 1.0) } else { (1.0, 0.0) };
    draw_line_segment_mut(
        canvas,
        (from.0 + shift.0, from.1 + shift.1),
        (to.0 + shift.0, to.1 + shift.1),
        color,
    );
}

/// Draw a line across every defect opening and a dot on its far point.
///
/// `offset` translates ROI coordinates into `canvas` coordinates.
pub fn annotate_defects(canvas: &mut RgbImage, report: &DefectReport, offset: (i32, i32)) {
    let translate = |[x, y]: [i32; 2]| (x + offset.0, y + offset.1);
    for defect in &report.defects {
        let (sx, sy) = translate(defect.start);
        let (ex, ey) = translate(defect.end);
        draw_thick_line(canvas, (sx as f32, sy as f32), (ex as f32, ey as f32), GAP_LINE_COLOR);
        draw_filled_circle_mut(canvas, translate(defect.far), FAR_POINT_RADIUS, FAR_POINT_COLOR);
    }
}
