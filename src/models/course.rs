// Course layout entities
//
// A Course owns 18 Holes; yardages live on TeeBoxes so a hole can play
// differently from different markers. Courses are created by seeding and
// treated as immutable afterwards.

use serde::{Deserialize, Serialize};

use crate::models::{CourseId, HoleId, TeeBoxId};

/// A course layout. The four "feel" knobs feed the stroke model directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub location: String,
    /// Overall difficulty, centered around 7.5 on an arbitrary scale.
    pub difficulty_rating: f64,
    /// Stimp-like greens speed; values above 10 punish weak putters.
    pub greens_speed: f64,
    pub fairway_firmness: f64,
    pub rough_severity: f64,
}

/// A single hole on a course. Hazard knobs are deliberately coarse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hole {
    pub id: HoleId,
    pub course: CourseId,
    /// 1-18, unique per course.
    pub number: u8,
    /// 3, 4 or 5 (occasionally 6 on oddball layouts).
    pub par: u8,
    /// 1 = hardest hole on the card, 18 = easiest.
    pub stroke_index: Option<u8>,
    pub bunker_count: u8,
    pub water_in_play: bool,
    pub trees_in_play: bool,
    pub green_slope: f64,
    pub elevation_change: i16,
}

/// A tee setup for a hole (e.g. Championship, Members).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeeBox {
    pub id: TeeBoxId,
    pub hole: HoleId,
    pub name: String,
    pub color: String,
    pub yardage: u16,
    pub rating: Option<f64>,
    pub slope: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_serializes_round_trip() {
        let course = Course {
            id: CourseId(1),
            name: "Pebble Creek".to_string(),
            location: "CA".to_string(),
            difficulty_rating: 7.8,
            greens_speed: 11.0,
            fairway_firmness: 6.0,
            rough_severity: 7.0,
        };

        let json = serde_json::to_string(&course).unwrap();
        let back: Course = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "Pebble Creek");
        assert_eq!(back.id, CourseId(1));
    }

    #[test]
    fn test_hole_optional_stroke_index() {
        let hole = Hole {
            id: HoleId(7),
            course: CourseId(1),
            number: 7,
            par: 3,
            stroke_index: None,
            bunker_count: 3,
            water_in_play: true,
            trees_in_play: false,
            green_slope: 5.0,
            elevation_change: -20,
        };

        let json = serde_json::to_string(&hole).unwrap();
        assert!(json.contains("\"stroke_index\":null"));
    }
}
