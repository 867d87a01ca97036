use serde::{Deserialize, Serialize};

use crate::types::{Contour, ContourAreas, GestureLabel};

/// Contours smaller than this are too far away (or too small) to read.
pub const MIN_HAND_AREA: f64 = 2000.0;
/// Upper area ratio for a closed fist.
pub const FIST_MAX_RATIO: f64 = 12.0;
/// Upper area ratio for the thumbs-style sign; above it a single finger is raised.
pub const FIXE_MAX_RATIO: f64 = 17.5;
/// Upper area ratio for three raised fingers; above it the hand makes the ok sign.
pub const THREE_MAX_RATIO: f64 = 27.0;

/// Label plus the measurements it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureReading {
    pub label: GestureLabel,
    /// Finger gaps plus one
    pub finger_count: u32,
    pub areas: ContourAreas,
}

/// Fixed decision table from finger count and area ratio to a gesture.
#[derive(Debug, Clone, Copy, Default)]
pub struct GestureClassifier;

impl GestureClassifier {
    /// First matching row wins; counts outside 1..=5 ask the user to reposition.
    pub fn classify_measurements(&self, finger_count: u32, contour_area: f64, area_ratio: f64) -> GestureLabel {
        match finger_count {
            1 if contour_area < MIN_HAND_AREA => GestureLabel::PutHandInBox,
            1 if area_ratio < FIST_MAX_RATIO => GestureLabel::Zero,
            1 if area_ratio < FIXE_MAX_RATIO => GestureLabel::Fixe,
            1 => GestureLabel::One,
            2 => GestureLabel::Two,
            3 if area_ratio < THREE_MAX_RATIO => GestureLabel::Three,
            3 => GestureLabel::OkSign,
            4 => GestureLabel::Four,
            5 => GestureLabel::Five,
            _ => GestureLabel::Reposition,
        }
    }

    /// Classify a hand contour given its finger count (finger gaps + 1).
    pub fn classify(&self, contour: &Contour, finger_count: u32) -> GestureReading {
        let areas = ContourAreas::of(contour);
        GestureReading {
            label: self.classify_measurements(finger_count, areas.contour_area, areas.area_ratio),
            finger_count,
            areas,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(finger_count: u32, contour_area: f64, area_ratio: f64) -> GestureLabel {
        GestureClassifier.classify_measurements(finger_count, contour_area, area_ratio)
    }

    #[test]
    fn test_single_finger_boundaries() {
        assert_eq!(label(1, 1999.0, 50.0), GestureLabel::PutHandInBox);
        assert_eq!(label(1, 2000.0, 11.99), GestureLabel::Zero);
        assert_eq!(label(1, 2000.0, 12.0), GestureLabel::Fixe);
        assert_eq!(label(1, 2000.0, 17.49), GestureLabel::Fixe);
        assert_eq!(label(1, 2000.0, 17.5), GestureLabel::One);
    }

    #[test]
    fn test_three_finger_boundaries() {
        assert_eq!(label(3, 500.0, 26.99), GestureLabel::Three);
        assert_eq!(label(3, 500.0, 27.0), GestureLabel::OkSign);
    }

    #[test]
    fn test_area_does_not_matter_above_one_finger() {
        assert_eq!(label(2, 10.0, 0.0), GestureLabel::Two);
        assert_eq!(label(4, 10.0, 90.0), GestureLabel::Four);
        assert_eq!(label(5, 1e6, 3.0), GestureLabel::Five);
    }

    #[test]
    fn test_out_of_range_counts_reposition() {
        for count in [0, 6, 7, 42] {
            assert_eq!(label(count, 5000.0, 20.0), GestureLabel::Reposition);
        }
    }

    #[test]
    fn test_classification_is_pure() {
        let contour = Contour::new(vec![[0, 0], [60, 0], [60, 60], [30, 20], [0, 60]]);
        let before = contour.clone();

        let first = GestureClassifier.classify(&contour, 1);
        let second = GestureClassifier.classify(&contour, 1);

        assert_eq!(first, second);
        assert_eq!(contour, before);
        assert_eq!(first.finger_count, 1);
    }

    #[test]
    fn test_classify_uses_contour_areas() {
        // 100x100 square with a 40x40 bite: area 8400, hull 10000 - 800 = 9200
        let contour = Contour::new(vec![[0, 0], [100, 0], [100, 60], [60, 60], [60, 100], [0, 100]]);
        let reading = GestureClassifier.classify(&contour, 1);
        assert!((reading.areas.contour_area - 8400.0).abs() < 1e-9);
        assert!((reading.areas.hull_area - 9200.0).abs() < 1e-9);
        // ratio ~= 9.52 -> closed fist
        assert_eq!(reading.label, GestureLabel::Zero);
    }
}
