// Tick scheduler
//
// Advances the virtual clock and walks every group forward through its
// hole sequence. Per group the loop is cooperative: one hole per
// iteration, strictly ordered, atomic at hole boundaries. Two guards
// matter for correctness and must not be removed:
//
// - First-hole guard: a group that just teed off is mid-hole until
//   tee_time + duration; the clock can pass the tee without the group
//   owing a completed hole yet.
// - Human brake: a group containing a human processes at most one hole
//   per tick, so the human gets a chance to submit scores between ticks.

use std::collections::HashMap;

use chrono::Duration;
use log::debug;
use rand::Rng;

use crate::analytics::leaderboard::{projected_cut, recompute_positions};
use crate::config::EngineConfig;
use crate::engine::pace::minutes_for_hole;
use crate::engine::rounds::rollover_if_complete;
use crate::engine::routing::next_hole;
use crate::engine::scoring::{simulate_bot_hole, HoleSim};
use crate::error::{EngineError, EngineResult};
use crate::models::course::{Course, Hole};
use crate::models::tournament::{
    HoleResult, Rain, RoundConditions, TournamentEvent, TournamentStatus,
};
use crate::models::{EntryId, ResultId, EventId, TournamentId};
use crate::store::Store;

/// Advance a tournament's clock by `minutes` and process every group.
pub fn tick(
    store: &mut Store,
    config: &EngineConfig,
    tournament: TournamentId,
    minutes: i64,
    rng: &mut impl Rng,
) -> EngineResult<()> {
    let (current_time, round, course_id, conditions) = {
        let t = store.tournament_mut(tournament)?;
        t.current_time = t.current_time + Duration::minutes(minutes);
        if t.status == TournamentStatus::Setup {
            t.status = TournamentStatus::InProgress;
        }
        let conditions = t
            .round_conditions
            .get(&t.current_round)
            .copied()
            .unwrap_or(RoundConditions {
                wind_mph: 0.0,
                rain: Rain::None,
            });
        (t.current_time, t.current_round, t.course, conditions)
    };

    let course: Course = store.course(course_id)?.clone();
    let holes: HashMap<u8, Hole> = store
        .holes_for_course(course_id)
        .into_iter()
        .map(|h| (h.number, h.clone()))
        .collect();

    for gid in store.group_ids_for(tournament) {
        let mut group = store.groups[&gid].clone();
        if group.is_finished {
            continue;
        }
        if group.next_action_time.is_none() {
            group.next_action_time = Some(group.tee_time);
        }
        if group.tee_time > current_time {
            store.groups.insert(gid, group);
            continue;
        }

        let members = store.member_entry_ids(gid);
        let group_size = if members.is_empty() { 4 } else { members.len() };
        let has_human = members
            .iter()
            .any(|e| store.entries[e].is_human);

        while !group.is_finished && group.next_action_time.unwrap() <= current_time {
            let hole_num = next_hole(group.start_hole, group.holes_completed);
            let hole = match holes.get(&hole_num) {
                Some(h) => h,
                None => {
                    group.is_finished = true;
                    break;
                }
            };
            let duration = minutes_for_hole(hole.par, group_size);

            // Mid-hole after the tee shot: completion lands in the future.
            if group.holes_completed == 0 && group.next_action_time == Some(group.tee_time) {
                let completion = group.tee_time + Duration::minutes(duration);
                if completion > current_time {
                    group.next_action_time = Some(completion);
                    break;
                }
            }

            simulate_group_hole(
                store,
                tournament,
                &members,
                hole,
                &course,
                conditions,
                round,
                current_time,
                rng,
            )?;

            for eid in &members {
                let is_human = store.entries[eid].is_human;
                let played_this_hole = store.result_for(*eid, round, hole_num).is_some();
                let e = store.entry_mut(*eid)?;
                if !is_human || played_this_hole {
                    e.thru_hole = e.thru_hole.max(hole_num);
                }
                store.recompute_entry_totals(*eid, round)?;
            }

            group.holes_completed += 1;
            if group.holes_completed >= 18 {
                group.is_finished = true;
            } else {
                group.current_hole = next_hole(group.start_hole, group.holes_completed);
            }
            group.next_action_time = Some(group.next_action_time.unwrap() + Duration::minutes(duration));

            if has_human {
                // One hole per tick for human groups.
                break;
            }
        }

        store.groups.insert(gid, group);
    }

    recompute_positions(store, tournament)?;
    if round <= 2 {
        let cut = projected_cut(store, tournament)?;
        store.tournament_mut(tournament)?.projected_cut_score = cut;
    }

    rollover_if_complete(store, config, tournament, rng)?;
    Ok(())
}

/// Simulate and insert the hole for every bot in the group that does not
/// have a result yet (get-or-create; bot results are never overwritten),
/// emitting feed events for notable scores.
#[allow(clippy::too_many_arguments)]
fn simulate_group_hole(
    store: &mut Store,
    tournament: TournamentId,
    members: &[EntryId],
    hole: &Hole,
    course: &Course,
    conditions: RoundConditions,
    round: u8,
    now: chrono::DateTime<chrono::Utc>,
    rng: &mut impl Rng,
) -> EngineResult<()> {
    let sim = HoleSim {
        hole,
        course,
        conditions,
        round_number: round,
    };

    for eid in members {
        let (is_bot, golfer_id) = {
            let e = store.entry(*eid)?;
            (e.is_bot(), e.golfer)
        };
        if !is_bot {
            continue;
        }
        if store.result_for(*eid, round, hole.number).is_some() {
            continue;
        }

        let golfer = store.golfer(golfer_id.unwrap())?.clone();
        let (strokes, stats) = {
            let entry = store.entry_mut(*eid)?;
            simulate_bot_hole(entry, &golfer, &sim, rng)
        };

        let min_ok = (hole.par as i32 - 2).max(1);
        if (strokes as i32) < min_ok || strokes > hole.par + 4 {
            return Err(EngineError::invariant(format!(
                "simulated strokes {} out of range on par {}",
                strokes, hole.par
            )));
        }

        store.add_result(HoleResult {
            id: ResultId(0),
            entry: *eid,
            round_number: round,
            hole_number: hole.number,
            strokes,
            stats: Some(stats),
            created_at: now,
        });

        emit_score_event(store, tournament, *eid, hole, strokes, round, now)?;
    }
    Ok(())
}

/// Birdies and better, doubles and worse make the feed.
fn emit_score_event(
    store: &mut Store,
    tournament: TournamentId,
    entry: EntryId,
    hole: &Hole,
    strokes: u8,
    round: u8,
    now: chrono::DateTime<chrono::Utc>,
) -> EngineResult<()> {
    let diff = strokes as i32 - hole.par as i32;
    let name = store.entry(entry)?.display_name.clone();

    let (text, importance) = if strokes == 1 {
        (format!("{} makes a HOLE-IN-ONE at No. {}!", name, hole.number), 4)
    } else if diff <= -3 {
        (format!("{} makes ALBATROSS at No. {}!", name, hole.number), 4)
    } else if diff == -2 {
        (format!("{} eagles No. {}", name, hole.number), 3)
    } else if diff == -1 {
        (format!("{} birdies No. {}", name, hole.number), 2)
    } else if diff == 2 {
        (format!("{} double bogeys No. {}", name, hole.number), 1)
    } else if diff >= 3 {
        (
            format!("{} cards a {} at No. {}", name, strokes, hole.number),
            1,
        )
    } else {
        return Ok(());
    };

    store.add_event(TournamentEvent {
        id: EventId(0),
        tournament,
        round_number: round,
        text,
        importance,
        created_at: now,
    });
    Ok(())
}

/// Advance the clock to just past the human group's tee time.
pub fn sim_to_tee(
    store: &mut Store,
    config: &EngineConfig,
    tournament: TournamentId,
    rng: &mut impl Rng,
) -> EngineResult<()> {
    let human_group = store
        .group_ids_for(tournament)
        .into_iter()
        .find(|gid| store.group_contains_human(*gid))
        .ok_or_else(|| EngineError::validation("tournament has no human players"))?;

    let (tee_time, now) = {
        let g = &store.groups[&human_group];
        (g.tee_time, store.tournament(tournament)?.current_time)
    };
    let minutes = (tee_time - now).num_minutes().max(0) + 1;
    debug!("sim-to-tee: advancing {} minutes", minutes);
    tick(store, config, tournament, minutes, rng)
}

/// Tick in 15-minute steps until the round rolls over or the tournament
/// finishes, then a 10-minute catch-up. Bounded by the iteration cap.
pub fn sim_to_end_of_day(
    store: &mut Store,
    config: &EngineConfig,
    tournament: TournamentId,
    rng: &mut impl Rng,
) -> EngineResult<()> {
    let start_round = store.tournament(tournament)?.current_round;

    for i in 0..config.max_day_iterations {
        tick(store, config, tournament, 15, rng)?;
        let t = store.tournament(tournament)?;
        if t.current_round != start_round || t.status == TournamentStatus::Finished {
            debug!("sim-to-end-of-day: done after {} ticks", i + 1);
            break;
        }
    }

    tick(store, config, tournament, 10, rng)
}
