use geo::Simplify;

use crate::types::Contour;

/// Douglas-Peucker reduction of a closed contour using geo's implementation.
///
/// The result only contains vertices of the input, in the same order, and is
/// returned open (the closing point is not repeated).
pub fn approximate_polygon(contour: &Contour, epsilon: f64) -> Contour {
    if contour.len() < 3 || epsilon <= 0.0 {
        return contour.clone();
    }

    let simplified = contour.to_closed_line_string().simplify(&epsilon);
    let mut points: Vec<[i32; 2]> = simplified
        .coords()
        .map(|coord| [coord.x.round() as i32, coord.y.round() as i32])
        .collect();

    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    Contour::new(points)
}

/// Tolerance proportional to the contour perimeter.
pub fn approximation_epsilon(contour: &Contour, factor: f64) -> f64 {
    factor * contour.perimeter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collinear_points_are_dropped() {
        let contour = Contour::new(vec![
            [0, 0], [5, 0], [10, 0], [10, 5], [10, 10], [5, 10], [0, 10], [0, 5],
        ]);
        let approx = approximate_polygon(&contour, 0.5);
        assert_eq!(approx.points, vec![[0, 0], [10, 0], [10, 10], [0, 10]]);
    }

    #[test]
    fn test_corners_survive_small_tolerance() {
        let contour = Contour::new(vec![[0, 0], [10, 0], [10, 10], [5, 4], [0, 10]]);
        let approx = approximate_polygon(&contour, 0.5);
        assert_eq!(approx.points, contour.points);
    }

    #[test]
    fn test_epsilon_scales_with_perimeter() {
        let contour = Contour::new(vec![[0, 0], [100, 0], [100, 100], [0, 100]]);
        let epsilon = approximation_epsilon(&contour, 0.0005);
        assert!((epsilon - 0.2).abs() < 1e-9);
    }
}
