// Bot golfer templates
//
// A Golfer is a rated template the stroke model draws from; tournament
// participation happens through TournamentEntry. Ratings are 0-100.
// Volatility is variance control, not a skill, so it lives outside Ratings.

use serde::{Deserialize, Serialize};

use crate::models::GolferId;

pub const RATING_MIN: u8 = 0;
pub const RATING_MAX: u8 = 100;

/// Which side a player swings from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    #[serde(rename = "R")]
    Right,
    #[serde(rename = "L")]
    Left,
}

impl Default for Handedness {
    fn default() -> Self {
        Handedness::Right
    }
}

/// The 14 skill ratings that drive simulation, all in [0, 100].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Ratings {
    pub driving_power: u8,
    pub driving_accuracy: u8,
    pub approach: u8,
    pub short_game: u8,
    pub putting: u8,
    pub ball_striking: u8,
    pub consistency: u8,
    pub course_management: u8,
    pub discipline: u8,
    pub sand: u8,
    pub clutch: u8,
    pub risk_tolerance: u8,
    pub weather_handling: u8,
    pub endurance: u8,
}

impl Ratings {
    /// Single source of truth for which fields count toward `overall`.
    pub fn as_array(&self) -> [u8; 14] {
        [
            self.driving_power,
            self.driving_accuracy,
            self.approach,
            self.short_game,
            self.putting,
            self.ball_striking,
            self.consistency,
            self.course_management,
            self.discipline,
            self.sand,
            self.clutch,
            self.risk_tolerance,
            self.weather_handling,
            self.endurance,
        ]
    }
}

/// A rated bot golfer (real-world or fictional).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Golfer {
    pub id: GolferId,
    /// Unique across the roster; CSV upserts key on it.
    pub name: String,
    /// 3-letter ISO-ish code (USA/CAN/ENG/...).
    pub country: String,
    pub is_active: bool,
    pub handedness: Handedness,
    pub ratings: Ratings,
    /// Higher = wilder outcomes, in [0.70, 1.40].
    pub volatility: f64,
}

impl Golfer {
    /// Average of all rating fields, rounded to the nearest integer.
    /// Always computed so it cannot go stale.
    pub fn overall(&self) -> u8 {
        let vals = self.ratings.as_array();
        let sum: u32 = vals.iter().map(|&v| v as u32).sum();
        ((sum as f64 / vals.len() as f64).round()) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_ratings(v: u8) -> Ratings {
        Ratings {
            driving_power: v,
            driving_accuracy: v,
            approach: v,
            short_game: v,
            putting: v,
            ball_striking: v,
            consistency: v,
            course_management: v,
            discipline: v,
            sand: v,
            clutch: v,
            risk_tolerance: v,
            weather_handling: v,
            endurance: v,
        }
    }

    #[test]
    fn test_overall_is_mean_of_all_fourteen() {
        let g = Golfer {
            id: GolferId(1),
            name: "Test".to_string(),
            country: "USA".to_string(),
            is_active: true,
            handedness: Handedness::Right,
            ratings: flat_ratings(80),
            volatility: 1.0,
        };
        assert_eq!(g.overall(), 80);
    }

    #[test]
    fn test_overall_rounds_to_nearest() {
        let mut ratings = flat_ratings(80);
        ratings.putting = 87; // mean = (13*80 + 87)/14 = 80.5
        let g = Golfer {
            id: GolferId(2),
            name: "Rounding".to_string(),
            country: "ENG".to_string(),
            is_active: true,
            handedness: Handedness::Left,
            ratings,
            volatility: 1.1,
        };
        assert_eq!(g.overall(), 81);
    }

    #[test]
    fn test_handedness_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Handedness::Right).unwrap(), "\"R\"");
        assert_eq!(serde_json::to_string(&Handedness::Left).unwrap(), "\"L\"");
    }
}
