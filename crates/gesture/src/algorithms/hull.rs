use geo::ConvexHull;
use geo_types::{Coord, MultiPoint, Point};
use serde::{Deserialize, Serialize};

use crate::types::Contour;

/// Concavity between two consecutive hull vertices of a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvexityDefect {
    pub start_index: usize,
    pub end_index: usize,
    /// Polygon vertex deepest inside the gap
    pub far_index: usize,
    /// Distance from the far vertex to the hull edge
    pub depth: f64,
}

/// Convex hull of `polygon` as ascending indices into its vertices.
pub fn convex_hull_indices(polygon: &Contour) -> Vec<usize> {
    let points: MultiPoint<f64> = polygon
        .points
        .iter()
        .map(|&[x, y]| Point::new(x as f64, y as f64))
        .collect();
    let hull = points.convex_hull();

    let mut indices: Vec<usize> = hull
        .exterior()
        .coords()
        .filter_map(|coord| {
            polygon
                .points
                .iter()
                .position(|&[x, y]| x as f64 == coord.x && y as f64 == coord.y)
        })
        .collect();
    indices.sort_unstable();
    indices.dedup();
    indices
}

fn distance_to_line(point: Coord<f64>, start: Coord<f64>, end: Coord<f64>) -> f64 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length = dx.hypot(dy);
    if length == 0.0 {
        return (point.x - start.x).hypot(point.y - start.y);
    }
    ((point.x - start.x) * dy - (point.y - start.y) * dx).abs() / length
}

/// Deepest vertex between each pair of consecutive hull vertices.
///
/// Gaps in which every vertex lies on the hull edge produce no defect.
pub fn convexity_defects(polygon: &Contour, hull: &[usize]) -> Vec<ConvexityDefect> {
    let n = polygon.len();
    if hull.len() < 3 || n < 4 {
        return Vec::new();
    }

    let coord = |index: usize| {
        let [x, y] = polygon.points[index];
        Coord { x: x as f64, y: y as f64 }
    };

    let mut defects = Vec::new();
    for (i, &start_index) in hull.iter().enumerate() {
        let end_index = hull[(i + 1) % hull.len()];
        let (start, end) = (coord(start_index), coord(end_index));

        let mut deepest: Option<(usize, f64)> = None;
        let mut j = (start_index + 1) % n;
        while j != end_index {
            let depth = distance_to_line(coord(j), start, end);
            if depth > deepest.map_or(0.0, |(_, d)| d) {
                deepest = Some((j, depth));
            }
            j = (j + 1) % n;
        }

        if let Some((far_index, depth)) = deepest {
            defects.push(ConvexityDefect {
                start_index,
                end_index,
                far_index,
                depth,
            });
        }
    }
    defects
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Square with a V-shaped notch cut into the top edge
    fn notched_square() -> Contour {
        Contour::new(vec![[0, 0], [4, 0], [5, 6], [6, 0], [10, 0], [10, 10], [0, 10]])
    }

    #[test]
    fn test_hull_indices_skip_reflex_vertex() {
        let hull = convex_hull_indices(&notched_square());
        assert!(!hull.contains(&2));
        assert!([0, 4, 5, 6].iter().all(|index| hull.contains(index)));
    }

    #[test]
    fn test_single_defect_in_notch() {
        let polygon = notched_square();
        let hull = convex_hull_indices(&polygon);
        let defects = convexity_defects(&polygon, &hull);

        assert_eq!(defects.len(), 1);
        let defect = defects[0];
        assert_eq!(defect.far_index, 2);
        assert!(defect.start_index < 2 && defect.end_index > 2);
        assert!((defect.depth - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_convex_polygon_has_no_defects() {
        let square = Contour::new(vec![[0, 0], [10, 0], [10, 10], [0, 10]]);
        let hull = convex_hull_indices(&square);
        assert_eq!(hull.len(), 4);
        assert!(convexity_defects(&square, &hull).is_empty());
    }
}
