// Course catalog seeding
//
// Reads a JSON list of courses with per-hole layout data and upserts
// Course/Hole/TeeBox rows. Two tee boxes are generated per hole:
// Championship at the listed yardage and Members at 90% of it.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;

use crate::models::course::{Course, Hole, TeeBox};
use crate::models::{CourseId, HoleId, TeeBoxId};
use crate::store::Store;

fn default_difficulty() -> f64 {
    7.0
}
fn default_greens_speed() -> f64 {
    10.0
}
fn default_five() -> f64 {
    5.0
}

#[derive(Debug, Deserialize)]
pub struct CourseSeed {
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_difficulty")]
    pub difficulty_rating: f64,
    #[serde(default = "default_greens_speed")]
    pub greens_speed: f64,
    #[serde(default = "default_five")]
    pub fairway_firmness: f64,
    #[serde(default = "default_five")]
    pub rough_severity: f64,
    pub holes: Vec<HoleSeed>,
}

#[derive(Debug, Deserialize)]
pub struct HoleSeed {
    pub number: u8,
    pub par: u8,
    #[serde(default)]
    pub stroke_index: Option<u8>,
    pub yardage: u16,
    #[serde(default)]
    pub bunkers: u8,
    #[serde(default)]
    pub water: bool,
    #[serde(default)]
    pub trees: bool,
    #[serde(default = "default_five")]
    pub green_slope: f64,
    #[serde(default)]
    pub elevation_change: i16,
}

/// Parse a course seed file.
pub fn load_course_file(path: &Path) -> Result<Vec<CourseSeed>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("course seed file not found: {}", path.display()))?;
    let seeds: Vec<CourseSeed> =
        serde_json::from_str(&raw).with_context(|| "malformed course seed file")?;
    Ok(seeds)
}

/// Upsert every course in the seed list. Returns (created, updated).
pub fn seed_courses(store: &mut Store, seeds: &[CourseSeed]) -> (usize, usize) {
    let mut created = 0;
    let mut updated = 0;

    for seed in seeds {
        let course_id = match store.course_by_name(&seed.name) {
            Some(existing) => {
                let id = existing.id;
                let c = store.courses.get_mut(&id).unwrap();
                c.location = seed.location.clone();
                c.difficulty_rating = seed.difficulty_rating;
                c.greens_speed = seed.greens_speed;
                c.fairway_firmness = seed.fairway_firmness;
                c.rough_severity = seed.rough_severity;
                updated += 1;
                id
            }
            None => {
                created += 1;
                store.add_course(Course {
                    id: CourseId(0),
                    name: seed.name.clone(),
                    location: seed.location.clone(),
                    difficulty_rating: seed.difficulty_rating,
                    greens_speed: seed.greens_speed,
                    fairway_firmness: seed.fairway_firmness,
                    rough_severity: seed.rough_severity,
                })
            }
        };

        for h in &seed.holes {
            let hole_id = match store.hole_by_number(course_id, h.number) {
                Some(existing) => {
                    let id = existing.id;
                    let hole = store.holes.get_mut(&id).unwrap();
                    hole.par = h.par;
                    hole.stroke_index = h.stroke_index;
                    hole.bunker_count = h.bunkers;
                    hole.water_in_play = h.water;
                    hole.trees_in_play = h.trees;
                    hole.green_slope = h.green_slope;
                    hole.elevation_change = h.elevation_change;
                    id
                }
                None => store.add_hole(Hole {
                    id: HoleId(0),
                    course: course_id,
                    number: h.number,
                    par: h.par,
                    stroke_index: h.stroke_index,
                    bunker_count: h.bunkers,
                    water_in_play: h.water,
                    trees_in_play: h.trees,
                    green_slope: h.green_slope,
                    elevation_change: h.elevation_change,
                }),
            };

            upsert_tee(store, hole_id, "Championship", "black", h.yardage);
            upsert_tee(
                store,
                hole_id,
                "Members",
                "white",
                (h.yardage as f64 * 0.9) as u16,
            );
        }
    }

    info!("course seed: {} created, {} updated", created, updated);
    (created, updated)
}

fn upsert_tee(store: &mut Store, hole: HoleId, name: &str, color: &str, yardage: u16) {
    match store.tee_box_for_hole(hole, name) {
        Some(existing) => {
            let id = existing.id;
            let t = store.tee_boxes.get_mut(&id).unwrap();
            t.color = color.to_string();
            t.yardage = yardage;
        }
        None => {
            store.add_tee_box(TeeBox {
                id: TeeBoxId(0),
                hole,
                name: name.to_string(),
                color: color.to_string(),
                yardage,
                rating: None,
                slope: None,
            });
        }
    }
}

/// Load and apply a course seed file in one go.
pub fn seed_courses_from_file(store: &mut Store, path: &Path) -> Result<(usize, usize)> {
    let seeds = load_course_file(path)?;
    Ok(seed_courses(store, &seeds))
}
