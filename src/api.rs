// External API adapter
//
// Engine is the facade the outer surface (HTTP layer, CLI) talks to:
// create tournament, tick, sim-to-*, hole-result, shuffle-pairings, and
// read snapshots. Mutations are serialized per engine via the write lock
// and run against a cloned store that only commits on success, so a
// failed operation rolls back wholesale. Snapshot reads take the read
// lock and never block on each other.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, NaiveTime, Utc};
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::analytics::leaderboard::{best_rounds, projected_cut, recompute_positions, BestRound};
use crate::analytics::probability::win_probabilities;
use crate::config::EngineConfig;
use crate::engine::pairing::{build_groups, initial_draw, shuffle_pairings, GroupLayout};
use crate::engine::rounds::draw_conditions;
use crate::engine::tick::{sim_to_end_of_day, sim_to_tee, tick};
use crate::error::{EngineError, EngineResult};
use crate::models::course::{Course, Hole, TeeBox};
use crate::models::golfer::{Golfer, Handedness};
use crate::models::tournament::{
    Group, HoleResult, MatchResult, ProjectedCut, Tournament, TournamentEntry, TournamentEvent,
    TournamentFormat, TournamentStatus,
};
use crate::models::{CourseId, EntryId, GroupId, ResultId, TournamentId};
use crate::store::Store;

/// How the bot field is selected from the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    TopRanked,
    Amateur,
    Random,
    Mixed,
    MidTier,
}

/// Requested format; fourball collapses to match play in foursomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateFormat {
    Stroke,
    Match,
    MatchFourball,
}

/// A human participant in the create request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanSeed {
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub handedness: Handedness,
    #[serde(default)]
    pub avatar_color: String,
    #[serde(default)]
    pub team: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTournament {
    pub name: String,
    pub course_id: CourseId,
    #[serde(default)]
    pub golfer_count: usize,
    pub field_type: FieldType,
    pub format: CreateFormat,
    #[serde(default)]
    pub humans: Vec<HumanSeed>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoleResultRequest {
    pub entry_id: EntryId,
    pub hole_number: u8,
    pub strokes: u8,
    #[serde(default)]
    pub round_number: Option<u8>,
}

/// One entry plus everything the scoreboard needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrySnapshot {
    #[serde(flatten)]
    pub entry: TournamentEntry,
    /// Derived overall for bots; None for humans.
    pub overall: Option<u8>,
    pub hole_results: Vec<HoleResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSnapshot {
    #[serde(flatten)]
    pub group: Group,
    pub members: Vec<EntryId>,
}

/// The full read model for one tournament.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentSnapshot {
    #[serde(flatten)]
    pub tournament: Tournament,
    pub entries: Vec<EntrySnapshot>,
    pub groups: Vec<GroupSnapshot>,
    pub projected_cut: Option<ProjectedCut>,
    /// Last 10 events, newest first.
    pub recent_events: Vec<TournamentEvent>,
    /// Top 5 lowest rounds in progress.
    pub best_rounds: Vec<BestRound>,
    pub session_history: BTreeMap<String, Vec<MatchResult>>,
}

/// Course with its nested holes and tee boxes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub holes: Vec<HoleDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoleDetail {
    #[serde(flatten)]
    pub hole: Hole,
    pub tee_boxes: Vec<TeeBox>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GolferSummary {
    #[serde(flatten)]
    pub golfer: Golfer,
    pub overall: u8,
}

/// The engine facade. One instance owns the store; per-tournament
/// mutations are serialized by the write lock.
pub struct Engine {
    store: RwLock<Store>,
    config: EngineConfig,
    base_seed: u64,
    op_counter: AtomicU64,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Engine {
            store: RwLock::new(Store::new()),
            config,
            base_seed: rand::random(),
            op_counter: AtomicU64::new(0),
        }
    }

    /// Deterministic engine for tests: every request RNG derives from
    /// `seed` and the operation counter.
    pub fn with_seed(config: EngineConfig, seed: u64) -> Self {
        Engine {
            store: RwLock::new(Store::new()),
            config,
            base_seed: seed,
            op_counter: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn request_rng(&self) -> StdRng {
        let n = self.op_counter.fetch_add(1, Ordering::Relaxed);
        StdRng::seed_from_u64(self.base_seed.wrapping_add(n.wrapping_mul(0x9e3779b9)))
    }

    /// Run a mutation transactionally: the closure gets a cloned store,
    /// and the clone replaces the live store only on success.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Store, &mut StdRng) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let mut rng = self.request_rng();
        let mut guard = self.store.write().expect("store lock poisoned");
        let mut txn = guard.clone();
        match f(&mut txn, &mut rng) {
            Ok(v) => {
                *guard = txn;
                Ok(v)
            }
            Err(e) => Err(e),
        }
    }

    /// Read-only access to the store (snapshots, listings, tests).
    pub fn inspect<T>(&self, f: impl FnOnce(&Store) -> T) -> T {
        let guard = self.store.read().expect("store lock poisoned");
        f(&guard)
    }

    /// Write access outside the transaction path, for seeding.
    pub fn with_store_mut<T>(&self, f: impl FnOnce(&mut Store) -> T) -> T {
        let mut guard = self.store.write().expect("store lock poisoned");
        f(&mut guard)
    }

    // --- catalog reads ---

    pub fn courses(&self) -> Vec<Course> {
        self.inspect(|s| s.courses.values().cloned().collect())
    }

    pub fn course_detail(&self, id: CourseId) -> EngineResult<CourseDetail> {
        self.inspect(|s| {
            let course = s.course(id)?.clone();
            let holes = s
                .holes_for_course(id)
                .into_iter()
                .map(|h| HoleDetail {
                    hole: h.clone(),
                    tee_boxes: s.tee_boxes_for_hole(h.id).into_iter().cloned().collect(),
                })
                .collect();
            Ok(CourseDetail { course, holes })
        })
    }

    pub fn golfers(&self) -> Vec<GolferSummary> {
        self.inspect(|s| {
            s.golfers
                .values()
                .map(|g| GolferSummary {
                    overall: g.overall(),
                    golfer: g.clone(),
                })
                .collect()
        })
    }

    pub fn tournaments(&self) -> Vec<Tournament> {
        self.inspect(|s| s.tournaments.values().cloned().collect())
    }

    // --- operations ---

    /// Create a tournament, its field, and the round-1 groups atomically.
    pub fn create_tournament(&self, req: CreateTournament) -> EngineResult<TournamentId> {
        let config = self.config.clone();
        self.mutate(move |store, rng| create_tournament_in(store, &config, &req, rng))
    }

    pub fn tick(&self, id: TournamentId, minutes: Option<i64>) -> EngineResult<TournamentSnapshot> {
        let config = self.config.clone();
        let minutes = minutes.unwrap_or(config.default_tick_minutes);
        if minutes < 0 {
            return Err(EngineError::validation("minutes must be non-negative"));
        }
        self.mutate(|store, rng| {
            tick(store, &config, id, minutes, rng)?;
            build_snapshot(store, id)
        })
    }

    pub fn sim_to_tee(&self, id: TournamentId) -> EngineResult<TournamentSnapshot> {
        let config = self.config.clone();
        self.mutate(|store, rng| {
            sim_to_tee(store, &config, id, rng)?;
            build_snapshot(store, id)
        })
    }

    pub fn sim_to_end_of_day(&self, id: TournamentId) -> EngineResult<TournamentSnapshot> {
        let config = self.config.clone();
        self.mutate(|store, rng| {
            sim_to_end_of_day(store, &config, id, rng)?;
            build_snapshot(store, id)
        })
    }

    /// Upsert a hole result (human score entry or a correction).
    pub fn submit_hole_result(
        &self,
        id: TournamentId,
        req: HoleResultRequest,
    ) -> EngineResult<TournamentSnapshot> {
        self.mutate(|store, _rng| {
            submit_hole_result_in(store, id, &req)?;
            build_snapshot(store, id)
        })
    }

    pub fn shuffle_pairings(&self, id: TournamentId) -> EngineResult<TournamentSnapshot> {
        self.mutate(|store, rng| {
            shuffle_pairings(store, id, rng)?;
            build_snapshot(store, id)
        })
    }

    pub fn snapshot(&self, id: TournamentId) -> EngineResult<TournamentSnapshot> {
        self.inspect(|s| build_snapshot(s, id))
    }

    /// On-demand Monte-Carlo win probabilities for the live field.
    pub fn win_probabilities(&self, id: TournamentId) -> EngineResult<BTreeMap<EntryId, f64>> {
        let trials = self.config.win_prob_trials;
        let seed = self.base_seed ^ id.0 as u64;
        self.inspect(|s| win_probabilities(s, id, trials, seed))
    }
}

/// Normalize a start time to 12:30 UTC on the given (or current) day, so
/// tee times land in the morning for US viewers.
fn normalize_start_time(requested: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let date = requested.unwrap_or_else(Utc::now).date_naive();
    let half_past_noon = NaiveTime::from_hms_opt(12, 30, 0).unwrap();
    DateTime::from_naive_utc_and_offset(date.and_time(half_past_noon), Utc)
}

fn default_team(country: &str, requested: Option<&String>) -> String {
    match requested {
        Some(t) if !t.is_empty() => t.clone(),
        _ => {
            if country == "USA" {
                "USA".to_string()
            } else {
                "EUR".to_string()
            }
        }
    }
}

fn create_tournament_in(
    store: &mut Store,
    config: &EngineConfig,
    req: &CreateTournament,
    rng: &mut StdRng,
) -> EngineResult<TournamentId> {
    if req.name.trim().is_empty() {
        return Err(EngineError::validation("tournament name is required"));
    }
    store.course(req.course_id)?;

    let format = match req.format {
        CreateFormat::Stroke => TournamentFormat::Stroke,
        CreateFormat::Match | CreateFormat::MatchFourball => TournamentFormat::Match,
    };
    let fourball = req.format == CreateFormat::MatchFourball;
    let group_size = match (format, fourball) {
        (TournamentFormat::Stroke, _) => 4,
        (TournamentFormat::Match, true) => 4,
        (TournamentFormat::Match, false) => 2,
    };

    let start_time = normalize_start_time(req.start_time);
    let mut round_conditions = BTreeMap::new();
    round_conditions.insert(1u8, draw_conditions(rng));

    let tid = store.add_tournament(Tournament {
        id: TournamentId(0),
        name: req.name.trim().to_string(),
        course: req.course_id,
        status: TournamentStatus::Setup,
        format,
        start_time,
        current_time: start_time,
        current_round: 1,
        cut_size: config.cut_size,
        cut_applied: false,
        projected_cut_score: None,
        session_history: BTreeMap::new(),
        round_conditions,
    });

    // Roster ordered best-first for every field-selection flavor.
    let mut roster: Vec<Golfer> = store
        .golfers
        .values()
        .filter(|g| g.is_active)
        .cloned()
        .collect();
    roster.sort_by(|a, b| b.overall().cmp(&a.overall()).then(a.name.cmp(&b.name)));

    let selected: Vec<Golfer> = if format == TournamentFormat::Match {
        // Balance to 12 a side, counting human team members first.
        let mut h_usa = 0usize;
        let mut h_eur = 0usize;
        for h in &req.humans {
            let country: String = h.country.chars().take(3).collect();
            if default_team(&country, h.team.as_ref()) == "USA" {
                h_usa += 1;
            } else {
                h_eur += 1;
            }
        }
        let need_usa = 12usize.saturating_sub(h_usa);
        let need_eur = 12usize.saturating_sub(h_eur);

        let usa_bots: Vec<Golfer> = roster.iter().filter(|g| g.country == "USA").cloned().collect();
        let eur_bots: Vec<Golfer> = roster.iter().filter(|g| g.country != "USA").cloned().collect();
        usa_bots
            .into_iter()
            .take(need_usa)
            .chain(eur_bots.into_iter().take(need_eur))
            .collect()
    } else {
        let n = req.golfer_count.min(roster.len());
        match req.field_type {
            FieldType::TopRanked => roster.iter().take(n).cloned().collect(),
            FieldType::Amateur => roster.iter().rev().take(n).cloned().collect(),
            FieldType::Random => {
                let mut shuffled = roster.clone();
                shuffled.shuffle(rng);
                shuffled.into_iter().take(n).collect()
            }
            FieldType::MidTier => {
                let start = roster.len().saturating_sub(n) / 2;
                roster.iter().skip(start).take(n).cloned().collect()
            }
            FieldType::Mixed => {
                // 30% leaders, 50% from the middle third, the rest tail-enders.
                let top_count = n * 3 / 10;
                let mid_count = n / 2;
                let bottom_count = n - top_count - mid_count;
                let mid_start = roster.len() / 3;
                let mut picked: Vec<Golfer> = roster.iter().take(top_count).cloned().collect();
                picked.extend(roster.iter().skip(mid_start).take(mid_count).cloned());
                picked.extend(roster.iter().rev().take(bottom_count).cloned());
                picked
            }
        }
    };

    for g in &selected {
        let team = if format == TournamentFormat::Match {
            if g.country == "USA" {
                "USA".to_string()
            } else {
                "EUR".to_string()
            }
        } else {
            String::new()
        };
        store.add_entry(TournamentEntry {
            id: EntryId(0),
            tournament: tid,
            golfer: Some(g.id),
            display_name: g.name.clone(),
            is_human: false,
            team,
            total_strokes: 0,
            tournament_strokes: 0,
            thru_hole: 0,
            position: None,
            cut: false,
            sim_state: BTreeMap::new(),
            country: g.country.clone(),
            handedness: g.handedness,
            avatar_color: String::new(),
        });
    }

    for h in &req.humans {
        let name = h.name.trim();
        if name.is_empty() {
            return Err(EngineError::validation("human player name is required"));
        }
        let country: String = h.country.chars().take(3).collect();
        let team = if format == TournamentFormat::Match {
            default_team(&country, h.team.as_ref())
        } else {
            String::new()
        };
        store.add_entry(TournamentEntry {
            id: EntryId(0),
            tournament: tid,
            golfer: None,
            display_name: name.to_string(),
            is_human: true,
            team,
            total_strokes: 0,
            tournament_strokes: 0,
            thru_hole: 0,
            position: None,
            cut: false,
            sim_state: BTreeMap::new(),
            country,
            handedness: h.handedness,
            avatar_color: h.avatar_color.clone(),
        });
    }

    let ordered = initial_draw(store, tid, format, group_size, rng);
    build_groups(
        store,
        config,
        tid,
        &ordered,
        &GroupLayout {
            split_tees: format == TournamentFormat::Stroke,
            group_size,
            invert_split: false,
        },
    )?;

    info!(
        "created tournament {} ({} bots, {} humans)",
        tid,
        selected.len(),
        req.humans.len()
    );
    Ok(tid)
}

fn submit_hole_result_in(
    store: &mut Store,
    tournament: TournamentId,
    req: &HoleResultRequest,
) -> EngineResult<()> {
    let t = store.tournament(tournament)?;
    let course = t.course;
    let current_round = t.current_round;
    let now = t.current_time;

    let entry = store.entry(req.entry_id)?;
    if entry.tournament != tournament {
        return Err(EngineError::not_found(format!(
            "entry {} in tournament {}",
            req.entry_id, tournament
        )));
    }

    let hole = store
        .hole_by_number(course, req.hole_number)
        .ok_or_else(|| EngineError::validation(format!("no hole {} on course", req.hole_number)))?;
    let par = hole.par;
    let min_ok = (par as i32 - 2).max(1) as u8;
    let max_ok = par + 4;
    if req.strokes < min_ok || req.strokes > max_ok {
        return Err(EngineError::validation(format!(
            "strokes {} outside [{}, {}] for par {}",
            req.strokes, min_ok, max_ok, par
        )));
    }

    let round = req.round_number.unwrap_or(current_round);

    match store.result_for_mut(req.entry_id, round, req.hole_number) {
        Some(existing) => {
            if existing.strokes != req.strokes {
                existing.strokes = req.strokes;
                // Derived stats no longer match the corrected score.
                existing.stats = None;
            }
            existing.created_at = now;
        }
        None => {
            store.add_result(HoleResult {
                id: ResultId(0),
                entry: req.entry_id,
                round_number: round,
                hole_number: req.hole_number,
                strokes: req.strokes,
                stats: None,
                created_at: now,
            });
        }
    }

    {
        let e = store.entry_mut(req.entry_id)?;
        e.thru_hole = e.thru_hole.max(req.hole_number);
    }
    store.recompute_entry_totals(req.entry_id, round)?;
    recompute_positions(store, tournament)?;
    Ok(())
}

/// Assemble the full read model for one tournament.
pub fn build_snapshot(store: &Store, tournament: TournamentId) -> EngineResult<TournamentSnapshot> {
    let t = store.tournament(tournament)?.clone();

    let mut entries = Vec::new();
    for eid in store.entry_ids_for(tournament) {
        let entry = store.entry(eid)?.clone();
        let overall = match entry.golfer {
            Some(gid) => Some(store.golfer(gid)?.overall()),
            None => None,
        };
        let mut hole_results: Vec<HoleResult> =
            store.results_for_entry(eid).into_iter().cloned().collect();
        hole_results.sort_by_key(|r| (r.round_number, r.hole_number));
        entries.push(EntrySnapshot {
            entry,
            overall,
            hole_results,
        });
    }

    let groups: Vec<GroupSnapshot> = store
        .group_ids_for(tournament)
        .into_iter()
        .map(|gid: GroupId| GroupSnapshot {
            group: store.groups[&gid].clone(),
            members: store.member_entry_ids(gid),
        })
        .collect();

    let mut events: Vec<TournamentEvent> =
        store.events_for(tournament).into_iter().cloned().collect();
    events.sort_by_key(|e| (e.created_at, e.id));
    events.reverse();
    events.truncate(10);

    Ok(TournamentSnapshot {
        projected_cut: projected_cut(store, tournament)?,
        recent_events: events,
        best_rounds: best_rounds(store, tournament, 5)?,
        session_history: t.session_history.clone(),
        tournament: t,
        entries,
        groups,
    })
}
