// Bot stroke model
//
// Produces (strokes, per-hole stats) for a bot on one hole. Expected
// strokes start at par and accumulate hazard, course, weather, skill,
// form, momentum and pressure terms; the draw is Normal(expected, sigma)
// clamped to [par-2, par+4]. Derived stats (FIR/GIR/putts/proximity) are
// always self-consistent with the sampled strokes.
//
// All sampling goes through the injected Rng so tests can pin seeds.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::models::course::{Course, Hole};
use crate::models::golfer::Golfer;
use crate::models::tournament::{HoleStats, Rain, RoundConditions, RoundForm, TournamentEntry};

/// Drive distance (yards) that counts as a "long drive" in commentary.
const LONG_DRIVE_YDS: u32 = 320;

/// Normalized [0,1] view of a golfer's ratings plus volatility.
#[derive(Debug, Clone, Copy)]
pub struct SkillSet {
    pub power: f64,
    pub accuracy: f64,
    pub approach: f64,
    pub short_game: f64,
    pub putting: f64,
    pub ball_striking: f64,
    pub consistency: f64,
    pub course_management: f64,
    pub discipline: f64,
    pub sand: f64,
    pub clutch: f64,
    pub risk: f64,
    pub weather: f64,
    pub volatility: f64,
}

impl SkillSet {
    pub fn from_golfer(g: &Golfer) -> Self {
        let n = |v: u8| v as f64 / 100.0;
        let r = &g.ratings;
        SkillSet {
            power: n(r.driving_power),
            accuracy: n(r.driving_accuracy),
            approach: n(r.approach),
            short_game: n(r.short_game),
            putting: n(r.putting),
            ball_striking: n(r.ball_striking),
            consistency: n(r.consistency),
            course_management: n(r.course_management),
            discipline: n(r.discipline),
            sand: n(r.sand),
            clutch: n(r.clutch),
            risk: n(r.risk_tolerance),
            weather: n(r.weather_handling),
            volatility: g.volatility,
        }
    }
}

/// Everything the model needs to know about the hole being played.
#[derive(Debug, Clone, Copy)]
pub struct HoleSim<'a> {
    pub hole: &'a Hole,
    pub course: &'a Course,
    pub conditions: RoundConditions,
    pub round_number: u8,
}

/// Intrinsic hole difficulty from hazards and green contour.
pub fn hole_difficulty(hole: &Hole) -> f64 {
    let bunkers = hole.bunker_count.min(6) as f64;
    let mut d = bunkers * 0.10;
    if hole.water_in_play {
        d += 0.40;
    }
    if hole.trees_in_play {
        d += 0.20;
    }
    d + hole.green_slope * 0.03
}

fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

/// Par-weighted blend of the scoring skills, plus small contributions from
/// recovery and decision-making skills.
fn skill_mix(skills: &SkillSet, par: u8, messy: f64) -> f64 {
    let (w_power, w_bs, w_app, w_putt) = match par {
        5 => (0.35, 0.25, 0.20, 0.20),
        3 => (0.15, 0.45, 0.20, 0.20),
        _ => (0.25, 0.30, 0.20, 0.25),
    };
    skills.power * w_power
        + skills.ball_striking * w_bs
        + skills.approach * w_app
        + skills.putting * w_putt
        + skills.short_game * 0.06 * messy
        + skills.course_management * 0.04
        + skills.discipline * 0.03
}

fn weather_penalty(conditions: RoundConditions, skills: &SkillSet) -> f64 {
    let mut p = 0.0;
    if conditions.wind_mph > 5.0 {
        p += (conditions.wind_mph - 5.0) * 0.015 * (1.5 - skills.weather);
    }
    match conditions.rain {
        Rain::None => {}
        Rain::Light => p += 0.20 * (1.0 - skills.weather),
        Rain::Heavy => p += 0.50 * (1.0 - skills.weather),
    }
    p
}

/// Leaders on the weekend back nine feel it. Positive for nervy players,
/// negative relief for the genuinely clutch.
fn pressure_penalty(sim: &HoleSim, position: Option<usize>, skills: &SkillSet) -> f64 {
    let pos = match position {
        Some(p) if sim.round_number >= 4 && sim.hole.number >= 10 && p <= 5 => p,
        _ => return 0.0,
    };
    let intensity = if pos <= 3 { 1.0 } else { 0.5 };
    (0.75 - skills.clutch) * 0.6 * intensity
}

/// Lazily create this round's form/momentum state. Form is the day's fixed
/// draw; volatile and inconsistent players swing wider day to day.
fn round_state<'a>(
    entry: &'a mut TournamentEntry,
    round_number: u8,
    skills: &SkillSet,
    rng: &mut impl Rng,
) -> &'a mut RoundForm {
    if !entry.sim_state.contains_key(&round_number) {
        let form_sigma =
            (0.18 + (1.0 - skills.consistency) * 0.22) * clamp(skills.volatility, 0.6, 2.0);
        let form = Normal::new(0.0, form_sigma)
            .map(|n| n.sample(rng))
            .unwrap_or(0.0);
        entry.sim_state.insert(
            round_number,
            RoundForm {
                form,
                momentum: 0.0,
            },
        );
    }
    entry.sim_state.get_mut(&round_number).unwrap()
}

/// Simulate one hole for a bot entry.
///
/// Mutates the entry's per-round sim state (lazy form creation, momentum
/// update) and returns the sampled strokes with self-consistent stats.
pub fn simulate_bot_hole(
    entry: &mut TournamentEntry,
    golfer: &Golfer,
    sim: &HoleSim,
    rng: &mut impl Rng,
) -> (u8, HoleStats) {
    let skills = SkillSet::from_golfer(golfer);
    let hole = sim.hole;
    let course = sim.course;
    let par = hole.par as f64;

    let difficulty = hole_difficulty(hole);
    let messy = (difficulty / 1.2).min(1.0);

    let mut expected = par;
    expected += difficulty;
    expected += (course.difficulty_rating - 7.5) * 0.10;
    expected += (1.0 - skills.accuracy) * (course.rough_severity / 10.0) * 0.35;
    expected += (course.fairway_firmness / 10.0) * 0.15 * (1.0 - skills.approach);
    if hole.water_in_play {
        expected += (1.0 - skills.accuracy) * 0.22 + (1.0 - skills.discipline) * 0.10;
    }
    if hole.trees_in_play {
        expected += (1.0 - skills.accuracy) * 0.14;
    }
    expected += hole.bunker_count.min(6) as f64 * 0.03 * (1.0 - skills.sand);
    expected += hole.green_slope * 0.02 * (1.0 - skills.putting)
        + (course.greens_speed - 10.0).max(0.0) * 0.08 * (1.0 - skills.putting);
    expected += weather_penalty(sim.conditions, &skills);
    expected += (0.70 - skill_mix(&skills, hole.par, messy)) * 1.15;

    let position = entry.position;
    let state = round_state(entry, sim.round_number, &skills, rng);
    expected += state.form;
    expected += state.momentum;

    expected += -(skills.risk - 0.5) * 0.06;
    expected += -(skills.clutch - 0.5) * (0.04 + 0.04 * messy);
    let pressure = pressure_penalty(sim, position, &skills);
    expected += pressure;

    let base_sigma = 0.38 + (1.0 - skills.consistency) * 0.35;
    let mut sigma = base_sigma * clamp(skills.volatility, 0.6, 2.0) + skills.risk * 0.06;
    if pressure > 0.05 {
        sigma += 0.20;
    }

    let draw = Normal::new(expected, sigma)
        .map(|n| n.sample(rng))
        .unwrap_or(expected);
    let min_strokes = (hole.par as i32 - 2).max(1);
    let strokes = (draw.round() as i32).clamp(min_strokes, hole.par as i32 + 4) as u8;

    // Streakiness: birdies feed momentum, blowups kill it. Consistent
    // players carry momentum longer but react less to single results.
    let streak_factor = 0.10 + (1.0 - skills.consistency) * 0.12;
    let decay = 0.62 + skills.consistency * 0.20;
    let delta = hole.par as f64 - strokes as f64;
    state.momentum = clamp(state.momentum * decay + streak_factor * delta, -0.75, 0.75);

    let stats = derive_stats(&skills, hole, course, strokes, rng);
    (strokes, stats)
}

/// Derive FIR/GIR/putts/proximity/drive stats consistent with `strokes`,
/// then attach commentary and an excitement grade.
pub fn derive_stats(
    skills: &SkillSet,
    hole: &Hole,
    course: &Course,
    strokes: u8,
    rng: &mut impl Rng,
) -> HoleStats {
    let par = hole.par;

    let (fir, drive_distance) = if par >= 4 {
        let noise = Normal::new(0.0, 10.0).map(|n| n.sample(rng)).unwrap_or(0.0);
        let dist =
            (275.0 + skills.power * 45.0 + noise + (course.fairway_firmness - 5.0) * 3.0).round();
        let drive = dist.max(0.0) as u32;

        let mut p = 0.50 + skills.accuracy * 0.40 - skills.risk * 0.10
            + skills.course_management * 0.05;
        if hole.trees_in_play {
            p -= 0.10;
        }
        if strokes >= par + 2 {
            p -= 0.40;
        }
        if strokes < par {
            p += 0.20;
        }
        let hit = rng.gen::<f64>() < clamp(p, 0.10, 0.95);
        (Some(hit), Some(drive))
    } else {
        (None, None)
    };

    let gir_p = if strokes < par {
        0.95
    } else if strokes == par {
        0.65 + skills.approach * 0.15 + skills.short_game * 0.15
    } else if strokes == par + 1 {
        0.15
    } else {
        0.05
    };
    let gir = rng.gen::<f64>() < gir_p;

    let putts = if strokes == 1 {
        0
    } else if gir {
        (strokes as i32 - (par as i32 - 2)).max(0) as u8
    } else if strokes < par {
        // Birdie-or-better without the green: usually a tap-in after a
        // great pitch, occasionally holed from off the green.
        if rng.gen::<f64>() < 0.20 {
            0
        } else {
            1
        }
    } else {
        (strokes as i32 - (par as i32 - 1)).max(0) as u8
    };

    let prox_to_hole = if gir {
        match putts {
            0 => 0.0,
            1 => rng.gen_range(3.0..12.0),
            2 => rng.gen_range(15.0..40.0),
            _ => rng.gen_range(40.0..70.0),
        }
    } else {
        rng.gen_range(25.0..60.0)
    };

    let (commentary, excitement) = describe_hole(par, strokes, gir, putts, drive_distance);

    HoleStats {
        fir,
        gir,
        putts,
        drive_distance,
        prox_to_hole,
        commentary,
        excitement,
    }
}

/// Commentary line and 0-10 excitement grade for a completed hole.
pub fn describe_hole(
    par: u8,
    strokes: u8,
    gir: bool,
    putts: u8,
    drive_distance: Option<u32>,
) -> (String, u8) {
    let diff = strokes as i32 - par as i32;
    let long_drive = drive_distance.map(|d| d >= LONG_DRIVE_YDS).unwrap_or(false);

    if strokes == 1 {
        return ("Holes out from the tee. An ace!".to_string(), 10);
    }

    let (mut text, mut excitement) = match diff {
        d if d <= -3 => ("Albatross! One for the ages.".to_string(), 10),
        -2 => {
            if putts == 0 {
                ("Holes out for eagle from off the green!".to_string(), 10)
            } else {
                ("Drains the putt for eagle!".to_string(), 10)
            }
        }
        -1 => {
            if putts == 0 {
                ("Chips in for birdie.".to_string(), 3)
            } else {
                ("Rolls in the birdie putt.".to_string(), 3)
            }
        }
        0 => {
            if !gir {
                ("Scrambles to save par.".to_string(), 2)
            } else if putts >= 3 {
                ("Grinds out par after three putts.".to_string(), 1)
            } else {
                ("Routine par.".to_string(), 0)
            }
        }
        1 => {
            if putts >= 3 {
                ("Three putts lead to bogey.".to_string(), 0)
            } else {
                ("Drops a shot. Bogey.".to_string(), 0)
            }
        }
        2 => ("Trouble off the tee leads to double bogey.".to_string(), 0),
        _ => ("A disaster hole. Card-wrecker.".to_string(), 0),
    };

    if long_drive && diff <= 0 {
        text.push_str(" Monster drive off the tee.");
        excitement = (excitement + 1).min(10);
    }

    (text, excitement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::golfer::{Handedness, Ratings};
    use crate::models::{CourseId, EntryId, GolferId, HoleId, TournamentId};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn test_course() -> Course {
        Course {
            id: CourseId(1),
            name: "Test National".to_string(),
            location: String::new(),
            difficulty_rating: 7.5,
            greens_speed: 10.5,
            fairway_firmness: 5.0,
            rough_severity: 5.0,
        }
    }

    fn test_hole(par: u8) -> Hole {
        Hole {
            id: HoleId(2),
            course: CourseId(1),
            number: 7,
            par,
            stroke_index: Some(7),
            bunker_count: 3,
            water_in_play: false,
            trees_in_play: true,
            green_slope: 5.0,
            elevation_change: 0,
        }
    }

    fn test_golfer(rating: u8) -> Golfer {
        Golfer {
            id: GolferId(3),
            name: "Sim Bot".to_string(),
            country: "USA".to_string(),
            is_active: true,
            handedness: Handedness::Right,
            ratings: Ratings {
                driving_power: rating,
                driving_accuracy: rating,
                approach: rating,
                short_game: rating,
                putting: rating,
                ball_striking: rating,
                consistency: rating,
                course_management: rating,
                discipline: rating,
                sand: rating,
                clutch: rating,
                risk_tolerance: 50,
                weather_handling: rating,
                endurance: rating,
            },
            volatility: 1.0,
        }
    }

    fn test_entry() -> TournamentEntry {
        TournamentEntry {
            id: EntryId(4),
            tournament: TournamentId(1),
            golfer: Some(GolferId(3)),
            display_name: "Sim Bot".to_string(),
            is_human: false,
            team: String::new(),
            total_strokes: 0,
            tournament_strokes: 0,
            thru_hole: 0,
            position: None,
            cut: false,
            sim_state: BTreeMap::new(),
            country: "USA".to_string(),
            handedness: Handedness::Right,
            avatar_color: String::new(),
        }
    }

    fn calm() -> RoundConditions {
        RoundConditions {
            wind_mph: 3.0,
            rain: Rain::None,
        }
    }

    #[test]
    fn test_hole_difficulty_components() {
        let mut hole = test_hole(4);
        hole.bunker_count = 2;
        hole.water_in_play = true;
        hole.trees_in_play = false;
        hole.green_slope = 5.0;
        // 2*0.10 + 0.40 + 5.0*0.03 = 0.75
        assert!((hole_difficulty(&hole) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_hole_difficulty_caps_bunkers_at_six() {
        let mut hole = test_hole(4);
        hole.bunker_count = 12;
        hole.water_in_play = false;
        hole.trees_in_play = false;
        hole.green_slope = 0.0;
        assert!((hole_difficulty(&hole) - 0.60).abs() < 1e-9);
    }

    #[test]
    fn test_strokes_always_clamped() {
        let course = test_course();
        let golfer = test_golfer(40);
        for par in [3u8, 4, 5] {
            let hole = test_hole(par);
            let sim = HoleSim {
                hole: &hole,
                course: &course,
                conditions: calm(),
                round_number: 1,
            };
            let mut entry = test_entry();
            let mut rng = StdRng::seed_from_u64(7);
            for _ in 0..500 {
                let (strokes, _) = simulate_bot_hole(&mut entry, &golfer, &sim, &mut rng);
                assert!(strokes as i32 >= (par as i32 - 2).max(1));
                assert!(strokes <= par + 4);
            }
        }
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let course = test_course();
        let hole = test_hole(4);
        let golfer = test_golfer(85);
        let sim = HoleSim {
            hole: &hole,
            course: &course,
            conditions: calm(),
            round_number: 1,
        };

        let mut a = test_entry();
        let mut b = test_entry();
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);

        let (s_a, stats_a) = simulate_bot_hole(&mut a, &golfer, &sim, &mut rng_a);
        let (s_b, stats_b) = simulate_bot_hole(&mut b, &golfer, &sim, &mut rng_b);

        assert_eq!(s_a, s_b);
        assert_eq!(stats_a.putts, stats_b.putts);
        assert_eq!(stats_a.gir, stats_b.gir);
        assert_eq!(stats_a.drive_distance, stats_b.drive_distance);
    }

    #[test]
    fn test_round_state_created_lazily_and_kept() {
        let course = test_course();
        let hole = test_hole(4);
        let golfer = test_golfer(85);
        let sim = HoleSim {
            hole: &hole,
            course: &course,
            conditions: calm(),
            round_number: 2,
        };
        let mut entry = test_entry();
        let mut rng = StdRng::seed_from_u64(9);

        assert!(entry.sim_state.is_empty());
        simulate_bot_hole(&mut entry, &golfer, &sim, &mut rng);
        let form_after_first = entry.sim_state.get(&2).unwrap().form;

        simulate_bot_hole(&mut entry, &golfer, &sim, &mut rng);
        let form_after_second = entry.sim_state.get(&2).unwrap().form;

        assert_eq!(form_after_first, form_after_second);
        assert_eq!(entry.sim_state.len(), 1);
    }

    #[test]
    fn test_momentum_stays_clamped() {
        let course = test_course();
        let hole = test_hole(4);
        let golfer = test_golfer(20); // weak and streaky
        let sim = HoleSim {
            hole: &hole,
            course: &course,
            conditions: calm(),
            round_number: 1,
        };
        let mut entry = test_entry();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..200 {
            simulate_bot_hole(&mut entry, &golfer, &sim, &mut rng);
            let m = entry.sim_state.get(&1).unwrap().momentum;
            assert!((-0.75..=0.75).contains(&m), "momentum {} out of range", m);
        }
    }

    #[test]
    fn test_stats_consistency_sweep() {
        let course = test_course();
        let golfer = test_golfer(70);
        let skills = SkillSet::from_golfer(&golfer);
        let mut rng = StdRng::seed_from_u64(123);

        for par in [3u8, 4, 5] {
            let hole = test_hole(par);
            for strokes in (par - 2).max(1)..=(par + 4) {
                for _ in 0..200 {
                    let stats = derive_stats(&skills, &hole, &course, strokes, &mut rng);

                    if stats.gir {
                        assert_eq!(
                            stats.putts as i32,
                            (strokes as i32 - (par as i32 - 2)).max(0),
                            "gir putts mismatch par {} strokes {}",
                            par,
                            strokes
                        );
                    }
                    if strokes >= 2 && stats.putts > 0 {
                        assert!(stats.putts < strokes, "putts {} >= strokes {}", stats.putts, strokes);
                    }
                    if par == 3 {
                        assert!(stats.fir.is_none());
                        assert!(stats.drive_distance.is_none());
                    } else {
                        assert!(stats.fir.is_some());
                        assert!(stats.drive_distance.is_some());
                    }
                }
            }
        }
    }

    #[test]
    fn test_describe_hole_grades() {
        let (text, excitement) = describe_hole(3, 1, true, 0, None);
        assert_eq!(excitement, 10);
        assert!(text.contains("ace"));

        let (_, excitement) = describe_hole(5, 3, true, 1, Some(280));
        assert_eq!(excitement, 10); // eagle

        let (_, excitement) = describe_hole(4, 3, true, 1, Some(280));
        assert_eq!(excitement, 3); // birdie

        let (_, excitement) = describe_hole(4, 4, false, 1, Some(280));
        assert_eq!(excitement, 2); // scramble

        let (_, excitement) = describe_hole(4, 4, true, 2, Some(280));
        assert_eq!(excitement, 0); // routine

        let (_, excitement) = describe_hole(4, 4, true, 2, Some(330));
        assert_eq!(excitement, 1); // routine + long drive
    }

    #[test]
    fn test_pressure_only_on_weekend_back_nine() {
        let course = test_course();
        let mut hole = test_hole(4);
        let golfer = test_golfer(60);
        let skills = SkillSet::from_golfer(&golfer);

        hole.number = 14;
        let sim = HoleSim {
            hole: &hole,
            course: &course,
            conditions: calm(),
            round_number: 4,
        };
        assert!(pressure_penalty(&sim, Some(1), &skills) > 0.0);
        assert_eq!(pressure_penalty(&sim, Some(9), &skills), 0.0);
        assert_eq!(pressure_penalty(&sim, None, &skills), 0.0);

        let sim_r1 = HoleSim {
            hole: &hole,
            course: &course,
            conditions: calm(),
            round_number: 1,
        };
        assert_eq!(pressure_penalty(&sim_r1, Some(1), &skills), 0.0);

        hole.number = 5;
        let sim_front = HoleSim {
            hole: &hole,
            course: &course,
            conditions: calm(),
            round_number: 4,
        };
        assert_eq!(pressure_penalty(&sim_front, Some(1), &skills), 0.0);
    }

    #[test]
    fn test_chasers_intensity_is_halved() {
        let course = test_course();
        let mut hole = test_hole(4);
        hole.number = 16;
        let golfer = test_golfer(40); // clutch 0.40 -> positive penalty
        let skills = SkillSet::from_golfer(&golfer);
        let sim = HoleSim {
            hole: &hole,
            course: &course,
            conditions: calm(),
            round_number: 4,
        };

        let leader = pressure_penalty(&sim, Some(2), &skills);
        let chaser = pressure_penalty(&sim, Some(5), &skills);
        assert!((leader - chaser * 2.0).abs() < 1e-9);
    }
}
