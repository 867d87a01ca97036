use geo::{Area, ConvexHull, EuclideanLength};
use geo_types::{Coord, LineString, Polygon};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::error::{GestureError, Result};

/// Named placement of the region of interest inside the frame.
#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Hash, Default
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RoiPosition {
    #[default]
    Left,
    Right,
}

impl RoiPosition {
    /// Parse a position name, rejecting anything other than `left` or `right`.
    pub fn from_name(name: &str) -> Result<Self> {
        name.trim().parse().map_err(|_| {
            GestureError::InvalidConfiguration(format!(
                "roi_position must be one of {:?}, got {:?}",
                <Self as VariantNames>::VARIANTS,
                name
            ))
        })
    }

    /// Fixed pixel bounds for this position.
    ///
    /// Both boxes are 200x200 and start on row 50; `left` spans columns
    /// 50..250 and `right` spans columns 400..600.
    pub fn roi(self) -> Roi {
        match self {
            Self::Left => Roi { left: 50, top: 50, width: 200, height: 200 },
            Self::Right => Roi { left: 400, top: 50, width: 200, height: 200 },
        }
    }
}

/// Rectangular sub-view of a frame, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Roi {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Roi {
    /// Exclusive right edge, saturating at `u32::MAX`
    pub fn right(&self) -> u32 {
        self.left.saturating_add(self.width)
    }

    /// Exclusive bottom edge, saturating at `u32::MAX`
    pub fn bottom(&self) -> u32 {
        self.top.saturating_add(self.height)
    }

    /// Fails with `RoiOutOfBounds` unless the whole box lies inside the frame.
    pub fn ensure_fits(&self, frame_width: u32, frame_height: u32) -> Result<()> {
        if self.width == 0
            || self.height == 0
            || self.right() > frame_width
            || self.bottom() > frame_height
        {
            return Err(GestureError::RoiOutOfBounds {
                left: self.left,
                top: self.top,
                roi_width: self.width,
                roi_height: self.height,
                frame_width,
                frame_height,
            });
        }
        Ok(())
    }

    pub fn to_rect(&self) -> imageproc::rect::Rect {
        imageproc::rect::Rect::at(self.left as i32, self.top as i32).of_size(self.width, self.height)
    }
}

/// Closed boundary curve of a foreground blob, in ROI pixel coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<[i32; 2]>,
}

impl Contour {
    pub fn new(points: Vec<[i32; 2]>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Boundary as a closed geo line string (first point repeated at the end).
    pub fn to_closed_line_string(&self) -> LineString<f64> {
        let mut coords: Vec<Coord<f64>> = self.points
            .iter()
            .map(|&[x, y]| Coord { x: x as f64, y: y as f64 })
            .collect();
        if let Some(&first) = coords.first() {
            coords.push(first);
        }
        LineString::new(coords)
    }

    pub fn to_geo_polygon(&self) -> Polygon<f64> {
        Polygon::new(self.to_closed_line_string(), vec![])
    }

    /// Enclosed area (shoelace, orientation independent).
    pub fn area(&self) -> f64 {
        self.to_geo_polygon().unsigned_area()
    }

    /// Length of the closed boundary, including the closing segment.
    pub fn perimeter(&self) -> f64 {
        self.to_closed_line_string().euclidean_length()
    }

    /// Convex hull of the boundary points as a polygon.
    pub fn convex_hull(&self) -> Polygon<f64> {
        self.to_closed_line_string().convex_hull()
    }

    pub fn hull_area(&self) -> f64 {
        self.convex_hull().unsigned_area()
    }
}

/// Discrete result of classifying one frame.
#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumIter, IntoStaticStr,
    PartialEq, Eq, Hash
)]
pub enum GestureLabel {
    #[strum(serialize = "Put hand in the box")]
    #[serde(rename = "Put hand in the box")]
    PutHandInBox,
    #[strum(serialize = "0")]
    #[serde(rename = "0")]
    Zero,
    #[strum(serialize = "1")]
    #[serde(rename = "1")]
    One,
    #[strum(serialize = "2")]
    #[serde(rename = "2")]
    Two,
    #[strum(serialize = "3")]
    #[serde(rename = "3")]
    Three,
    #[strum(serialize = "4")]
    #[serde(rename = "4")]
    Four,
    #[strum(serialize = "5")]
    #[serde(rename = "5")]
    Five,
    #[strum(serialize = "Fixe")]
    #[serde(rename = "Fixe")]
    Fixe,
    #[strum(serialize = "ok")]
    #[serde(rename = "ok")]
    OkSign,
    #[strum(serialize = "reposition")]
    #[serde(rename = "reposition")]
    Reposition,
}

impl GestureLabel {
    /// Overlay text for this label.
    pub fn text(self) -> &'static str {
        self.into()
    }
}

/// Hull and contour areas of the hand outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContourAreas {
    pub hull_area: f64,
    pub contour_area: f64,
    /// `(hull_area - contour_area) / contour_area * 100`, or 0 for an empty contour.
    pub area_ratio: f64,
}

impl ContourAreas {
    pub fn new(hull_area: f64, contour_area: f64) -> Self {
        let area_ratio = if contour_area > 0.0 {
            (hull_area - contour_area) / contour_area * 100.0
        } else {
            0.0
        };
        Self { hull_area, contour_area, area_ratio }
    }

    pub fn of(contour: &Contour) -> Self {
        Self::new(contour.hull_area(), contour.area())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn square(size: i32) -> Contour {
        Contour::new(vec![[0, 0], [size, 0], [size, size], [0, size]])
    }

    #[test]
    fn test_roi_position_parsing() {
        assert_eq!(RoiPosition::from_name("left").unwrap(), RoiPosition::Left);
        assert_eq!(RoiPosition::from_name("RIGHT").unwrap(), RoiPosition::Right);
        assert!(matches!(
            RoiPosition::from_name("center"),
            Err(GestureError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_roi_bounds() {
        let right = RoiPosition::Right.roi();
        assert_eq!((right.left, right.right()), (400, 600));
        assert_eq!((right.top, right.bottom()), (50, 250));
        assert!(right.ensure_fits(640, 480).is_ok());
        assert!(matches!(
            right.ensure_fits(320, 240),
            Err(GestureError::RoiOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_huge_roi_is_out_of_bounds() {
        let roi = Roi { left: u32::MAX - 5, top: 0, width: 100, height: u32::MAX };
        assert_eq!(roi.right(), u32::MAX);
        assert_eq!(roi.bottom(), u32::MAX);
        assert!(matches!(
            roi.ensure_fits(640, 480),
            Err(GestureError::RoiOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_contour_measurements() {
        let contour = square(10);
        assert!((contour.area() - 100.0).abs() < 1e-9);
        assert!((contour.perimeter() - 40.0).abs() < 1e-9);
        assert!((contour.hull_area() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_area_ratio_of_concave_contour() {
        // L shape: 3x3 square with a 2x2 bite removed from one corner
        let contour = Contour::new(vec![[0, 0], [3, 0], [3, 1], [1, 1], [1, 3], [0, 3]]);
        let areas = ContourAreas::of(&contour);
        assert!((areas.contour_area - 5.0).abs() < 1e-9);
        assert!((areas.hull_area - 7.0).abs() < 1e-9);
        assert!((areas.area_ratio - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_area_ratio_is_zero() {
        let areas = ContourAreas::new(0.0, 0.0);
        assert_eq!(areas.area_ratio, 0.0);
    }

    #[test]
    fn test_label_texts() {
        let texts: Vec<&str> = GestureLabel::iter().map(GestureLabel::text).collect();
        assert_eq!(
            texts,
            vec!["Put hand in the box", "0", "1", "2", "3", "4", "5", "Fixe", "ok", "reposition"]
        );
        assert_eq!(GestureLabel::OkSign.to_string(), "ok");
    }
}
