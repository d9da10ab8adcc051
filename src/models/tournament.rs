// Tournament entities
//
// The Tournament carries the virtual clock; Groups are the scheduler's unit
// of work; TournamentEntry is the scoreboard row shared by bots and humans.
// HoleResults are the ground truth every derived total is recomputed from.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::golfer::Handedness;
use crate::models::{CourseId, EntryId, EventId, GolferId, GroupId, MemberId, ResultId, TournamentId};

/// Lifecycle: setup -> in_progress -> (playoff ->)? finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    Setup,
    InProgress,
    Finished,
    Playoff,
}

/// Stroke play runs four rounds with a cut; match play is a two-day
/// Ryder-Cup-style team event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    Stroke,
    Match,
}

/// Rain bands for a round. Heavier rain punishes weak weather handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rain {
    None,
    Light,
    Heavy,
}

/// Weather drawn once per round.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoundConditions {
    pub wind_mph: f64,
    pub rain: Rain,
}

/// Per-round sim state for one entry, created lazily on the first
/// simulated hole of the round. `form` is the day's fixed draw; `momentum`
/// is the running streak term the scorer updates after every hole.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RoundForm {
    pub form: f64,
    pub momentum: f64,
}

/// Projected 36-hole cut line, refreshed during rounds 1-2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedCut {
    /// Score-to-par at the cut position.
    pub cut_score: i32,
    pub cut_to_par: i32,
    pub cut_position: usize,
    pub players_at_line: usize,
    pub players_inside: usize,
}

/// Archived outcome of one match-play group, stored in session_history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub group_id: GroupId,
    /// "USA", "EUR", or "Halved".
    pub winner: String,
    pub margin: u8,
    /// "3 UP" / "Halved".
    pub score: String,
    pub usa_names: Vec<String>,
    pub eur_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub course: CourseId,
    pub status: TournamentStatus,
    pub format: TournamentFormat,
    pub start_time: DateTime<Utc>,
    /// The virtual clock. Ticks advance it; nothing else does.
    pub current_time: DateTime<Utc>,
    /// 1-4 in regulation; 5+ while a playoff is running.
    pub current_round: u8,
    pub cut_size: usize,
    /// One-shot latch; once set, the cut flags are frozen.
    pub cut_applied: bool,
    pub projected_cut_score: Option<ProjectedCut>,
    /// Match-play archives keyed "R1", "R2", ...
    pub session_history: BTreeMap<String, Vec<MatchResult>>,
    /// Weather keyed by round number.
    pub round_conditions: BTreeMap<u8, RoundConditions>,
}

/// A participant: a bot backed by a Golfer template, or a human
/// (`golfer == None`). Only bots feed the stroke model; only humans gate
/// group advancement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentEntry {
    pub id: EntryId,
    pub tournament: TournamentId,
    pub golfer: Option<GolferId>,
    pub display_name: String,
    pub is_human: bool,
    /// "USA"/"EUR" in match play, empty otherwise.
    pub team: String,
    /// Strokes in the current round.
    pub total_strokes: i32,
    /// Cumulative strokes across all rounds.
    pub tournament_strokes: i32,
    /// Last hole number completed this round, 0 = not started.
    pub thru_hole: u8,
    /// 1-based with ties; None until any strokes are recorded.
    pub position: Option<usize>,
    pub cut: bool,
    /// Per-round form/momentum, keyed by round number.
    pub sim_state: BTreeMap<u8, RoundForm>,
    pub country: String,
    pub handedness: Handedness,
    pub avatar_color: String,
}

impl TournamentEntry {
    pub fn is_bot(&self) -> bool {
        !self.is_human && self.golfer.is_some()
    }
}

/// An ordered set of 2-4 entries playing together off a scheduled tee time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub tournament: TournamentId,
    pub tee_time: DateTime<Utc>,
    /// 1 = morning tee-1 wave, 2 = tee-10 wave on split-tee days.
    pub wave: u8,
    /// 1 or 10.
    pub start_hole: u8,
    /// Next hole to be played.
    pub current_hole: u8,
    /// 0..18.
    pub holes_completed: u8,
    /// When the group is due to finish its current hole.
    pub next_action_time: Option<DateTime<Utc>>,
    pub is_finished: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    pub id: MemberId,
    pub group: GroupId,
    pub entry: EntryId,
}

/// Per-hole derived stats. Always self-consistent with the sampled strokes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoleStats {
    /// Fairway in regulation; None on par 3s (no fairway to hit).
    pub fir: Option<bool>,
    /// Green in regulation.
    pub gir: bool,
    pub putts: u8,
    /// Driver distance in yards; None on par 3s.
    pub drive_distance: Option<u32>,
    /// Approach proximity in feet.
    pub prox_to_hole: f64,
    pub commentary: String,
    /// 0 (routine) .. 10 (walk-off eagle, ace).
    pub excitement: u8,
}

/// One player's result on one hole in one round. Insert-once for bots;
/// humans may correct a score, which upserts in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoleResult {
    pub id: ResultId,
    pub entry: EntryId,
    pub round_number: u8,
    pub hole_number: u8,
    pub strokes: u8,
    pub stats: Option<HoleStats>,
    pub created_at: DateTime<Utc>,
}

/// Feed item surfaced in the snapshot (birdies, eagles, disasters).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentEvent {
    pub id: EventId,
    pub tournament: TournamentId,
    pub round_number: u8,
    pub text: String,
    /// 1 (minor) .. 4 (ace/albatross).
    pub importance: u8,
    pub created_at: DateTime<Utc>,
}
