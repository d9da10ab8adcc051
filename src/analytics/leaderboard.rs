// Leaderboard computations
//
// Positions use competition ranking ordered by cumulative strokes; the
// projected cut tracks the live 36-hole line in score-to-par terms; best
// rounds feeds the "low rounds today" widget.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::tournament::ProjectedCut;
use crate::models::{EntryId, TournamentId};
use crate::store::Store;

/// Recompute entry positions from cumulative strokes.
///
/// Ties share the rank of the first member of the tie group; the next
/// group's rank jumps by the tie size ([70,70,71] -> [1,1,3]). Entries
/// with no recorded strokes keep no position.
///
/// Playoff holes (rounds past 4) rank as a tie-breaker among the tied
/// leaders rather than inflating their 72-hole totals, so a sudden-death
/// winner surfaces at position 1 instead of dropping down the board.
pub fn recompute_positions(store: &mut Store, tournament: TournamentId) -> EngineResult<()> {
    let mut scored: Vec<((i32, i32), EntryId)> = Vec::new();
    let mut unscored: Vec<EntryId> = Vec::new();
    for eid in store.entry_ids_for(tournament) {
        let e = store.entry(eid)?;
        if e.tournament_strokes > 0 {
            let playoff: i32 = store
                .results_for_entry(eid)
                .iter()
                .filter(|r| r.round_number > 4)
                .map(|r| r.strokes as i32)
                .sum();
            scored.push(((e.tournament_strokes - playoff, playoff), eid));
        } else {
            unscored.push(eid);
        }
    }
    scored.sort_by_key(|&(key, id)| (key, id));

    let mut last_key: Option<(i32, i32)> = None;
    let mut rank = 0usize;
    for (i, (key, eid)) in scored.iter().enumerate() {
        if last_key != Some(*key) {
            rank = i + 1;
            last_key = Some(*key);
        }
        store.entry_mut(*eid)?.position = Some(rank);
    }
    for eid in unscored {
        store.entry_mut(eid)?.position = None;
    }
    Ok(())
}

/// Project the 36-hole cut line from the live score-to-par distribution.
///
/// Only meaningful during rounds 1-2 before the cut latch; None once the
/// field fits inside the cut, or after the cut is applied.
pub fn projected_cut(store: &Store, tournament: TournamentId) -> EngineResult<Option<ProjectedCut>> {
    let t = store.tournament(tournament)?;
    if t.current_round > 2 || t.cut_applied {
        return Ok(None);
    }

    let entry_ids = store.entry_ids_for(tournament);
    if entry_ids.is_empty() {
        return Ok(None);
    }

    let pars: HashMap<u8, u8> = store
        .holes_for_course(t.course)
        .iter()
        .map(|h| (h.number, h.par))
        .collect();

    let mut scored: Vec<i32> = entry_ids
        .iter()
        .map(|eid| {
            store
                .results_for_entry(*eid)
                .iter()
                .filter(|r| r.round_number <= 2)
                .map(|r| r.strokes as i32 - pars.get(&r.hole_number).copied().unwrap_or(4) as i32)
                .sum()
        })
        .collect();
    scored.sort_unstable();

    let cut_size = t.cut_size;
    if scored.len() <= cut_size {
        return Ok(None);
    }

    let cut_val = scored[cut_size - 1];
    Ok(Some(ProjectedCut {
        cut_score: cut_val,
        cut_to_par: cut_val,
        cut_position: cut_size,
        players_at_line: scored.iter().filter(|&&s| s == cut_val).count(),
        players_inside: scored.iter().filter(|&&s| s < cut_val).count(),
    }))
}

/// One row of the "low rounds today" board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestRound {
    pub entry_id: EntryId,
    pub name: String,
    /// Score to par over the holes played this round.
    pub score: i32,
    /// Holes played, "F" once the round is complete.
    pub thru: String,
    pub raw_score: i32,
}

/// Lowest scores of the current round, best first.
pub fn best_rounds(
    store: &Store,
    tournament: TournamentId,
    limit: usize,
) -> EngineResult<Vec<BestRound>> {
    let t = store.tournament(tournament)?;
    let round = t.current_round;
    let pars: HashMap<u8, u8> = store
        .holes_for_course(t.course)
        .iter()
        .map(|h| (h.number, h.par))
        .collect();

    let mut rows: Vec<BestRound> = Vec::new();
    for eid in store.entry_ids_for(tournament) {
        let results: Vec<_> = store
            .results_for_entry(eid)
            .into_iter()
            .filter(|r| r.round_number == round)
            .collect();
        if results.is_empty() {
            continue;
        }

        let raw: i32 = results.iter().map(|r| r.strokes as i32).sum();
        let par: i32 = results
            .iter()
            .map(|r| pars.get(&r.hole_number).copied().unwrap_or(4) as i32)
            .sum();
        let played = results.len();

        rows.push(BestRound {
            entry_id: eid,
            name: store.entry(eid)?.display_name.clone(),
            score: raw - par,
            thru: if played >= 18 {
                "F".to_string()
            } else {
                played.to_string()
            },
            raw_score: raw,
        });
    }

    rows.sort_by_key(|r| r.score);
    rows.truncate(limit);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::course::{Course, Hole};
    use crate::models::golfer::Handedness;
    use crate::models::tournament::{
        HoleResult, Tournament, TournamentEntry, TournamentFormat, TournamentStatus,
    };
    use crate::models::{CourseId, HoleId, ResultId};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn setup(store: &mut Store, cut_size: usize) -> TournamentId {
        let course = store.add_course(Course {
            id: CourseId(0),
            name: "C".to_string(),
            location: String::new(),
            difficulty_rating: 7.5,
            greens_speed: 10.0,
            fairway_firmness: 5.0,
            rough_severity: 5.0,
        });
        for number in 1..=18u8 {
            store.add_hole(Hole {
                id: HoleId(0),
                course,
                number,
                par: 4,
                stroke_index: None,
                bunker_count: 2,
                water_in_play: false,
                trees_in_play: false,
                green_slope: 5.0,
                elevation_change: 0,
            });
        }
        let t0 = Utc.with_ymd_and_hms(2025, 6, 12, 12, 30, 0).unwrap();
        store.add_tournament(Tournament {
            id: TournamentId(0),
            name: "T".to_string(),
            course,
            status: TournamentStatus::InProgress,
            format: TournamentFormat::Stroke,
            start_time: t0,
            current_time: t0,
            current_round: 1,
            cut_size,
            cut_applied: false,
            projected_cut_score: None,
            session_history: BTreeMap::new(),
            round_conditions: BTreeMap::new(),
        })
    }

    fn add_entry(store: &mut Store, tid: TournamentId, name: &str, total: i32) -> EntryId {
        store.add_entry(TournamentEntry {
            id: EntryId(0),
            tournament: tid,
            golfer: None,
            display_name: name.to_string(),
            is_human: false,
            team: String::new(),
            total_strokes: 0,
            tournament_strokes: total,
            thru_hole: 0,
            position: None,
            cut: false,
            sim_state: BTreeMap::new(),
            country: "USA".to_string(),
            handedness: Handedness::Right,
            avatar_color: String::new(),
        })
    }

    fn record(store: &mut Store, entry: EntryId, round: u8, hole: u8, strokes: u8) {
        let now = Utc.with_ymd_and_hms(2025, 6, 12, 13, 0, 0).unwrap();
        store.add_result(HoleResult {
            id: ResultId(0),
            entry,
            round_number: round,
            hole_number: hole,
            strokes,
            stats: None,
            created_at: now,
        });
    }

    #[test]
    fn test_positions_tie_ranking() {
        let mut store = Store::new();
        let tid = setup(&mut store, 65);
        let scores = [70, 70, 71, 72, 72, 73];
        let entries: Vec<EntryId> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| add_entry(&mut store, tid, &format!("P{}", i), *s))
            .collect();

        recompute_positions(&mut store, tid).unwrap();

        let positions: Vec<usize> = entries
            .iter()
            .map(|e| store.entry(*e).unwrap().position.unwrap())
            .collect();
        assert_eq!(positions, vec![1, 1, 3, 4, 4, 6]);
    }

    #[test]
    fn test_positions_playoff_breaks_tie_without_sinking_leaders() {
        let mut store = Store::new();
        let tid = setup(&mut store, 65);
        // Two tied at 280 after regulation; third finished on 281.
        let a = add_entry(&mut store, tid, "A", 280);
        let b = add_entry(&mut store, tid, "B", 280);
        let c = add_entry(&mut store, tid, "C", 281);

        // A wins the playoff hole; both playoff scores land in the totals.
        record(&mut store, a, 5, 1, 4);
        record(&mut store, b, 5, 1, 5);
        store.entry_mut(a).unwrap().tournament_strokes = 284;
        store.entry_mut(b).unwrap().tournament_strokes = 285;

        recompute_positions(&mut store, tid).unwrap();

        assert_eq!(store.entry(a).unwrap().position, Some(1));
        assert_eq!(store.entry(b).unwrap().position, Some(2));
        assert_eq!(store.entry(c).unwrap().position, Some(3));
    }

    #[test]
    fn test_positions_none_without_strokes() {
        let mut store = Store::new();
        let tid = setup(&mut store, 65);
        let played = add_entry(&mut store, tid, "Played", 72);
        let waiting = add_entry(&mut store, tid, "Waiting", 0);

        recompute_positions(&mut store, tid).unwrap();

        assert_eq!(store.entry(played).unwrap().position, Some(1));
        assert_eq!(store.entry(waiting).unwrap().position, None);
    }

    #[test]
    fn test_projected_cut_none_when_field_fits() {
        let mut store = Store::new();
        let tid = setup(&mut store, 5);
        for i in 0..5 {
            let e = add_entry(&mut store, tid, &format!("P{}", i), 0);
            record(&mut store, e, 1, 1, 4);
        }
        assert!(projected_cut(&store, tid).unwrap().is_none());
    }

    #[test]
    fn test_projected_cut_line_and_counts() {
        let mut store = Store::new();
        let tid = setup(&mut store, 3);
        // Score-to-par: -1, 0, +1, +1, +2 with cut_size 3 -> line at +1.
        for (i, strokes) in [3u8, 4, 5, 5, 6].iter().enumerate() {
            let e = add_entry(&mut store, tid, &format!("P{}", i), 0);
            record(&mut store, e, 1, 1, *strokes);
        }

        let cut = projected_cut(&store, tid).unwrap().unwrap();
        assert_eq!(cut.cut_score, 1);
        assert_eq!(cut.cut_to_par, 1);
        assert_eq!(cut.cut_position, 3);
        assert_eq!(cut.players_at_line, 2);
        assert_eq!(cut.players_inside, 2);
    }

    #[test]
    fn test_projected_cut_suppressed_after_latch() {
        let mut store = Store::new();
        let tid = setup(&mut store, 2);
        for i in 0..4 {
            let e = add_entry(&mut store, tid, &format!("P{}", i), 0);
            record(&mut store, e, 1, 1, 4);
        }
        store.tournament_mut(tid).unwrap().cut_applied = true;
        assert!(projected_cut(&store, tid).unwrap().is_none());
    }

    #[test]
    fn test_best_rounds_sorted_and_formatted() {
        let mut store = Store::new();
        let tid = setup(&mut store, 65);

        let hot = add_entry(&mut store, tid, "Hot", 0);
        for hole in 1..=18u8 {
            record(&mut store, hot, 1, hole, if hole <= 4 { 3 } else { 4 });
        }
        let mid = add_entry(&mut store, tid, "Mid", 0);
        for hole in 1..=9u8 {
            record(&mut store, mid, 1, hole, 4);
        }
        // No results this round: stays off the board.
        let _idle = add_entry(&mut store, tid, "Idle", 0);

        let rows = best_rounds(&store, tid, 5).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Hot");
        assert_eq!(rows[0].score, -4);
        assert_eq!(rows[0].thru, "F");
        assert_eq!(rows[1].name, "Mid");
        assert_eq!(rows[1].score, 0);
        assert_eq!(rows[1].thru, "9");
    }
}
