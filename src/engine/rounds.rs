// Round and tournament rollover
//
// Fires when every group reports finished: archive match results, apply
// the cut after round 2, advance the round with the format's reseed
// policy, and detect the stroke-play playoff or the finish.

use log::info;
use rand::Rng;

use crate::analytics::leaderboard::recompute_positions;
use crate::config::EngineConfig;
use crate::engine::cut::apply_cut;
use crate::engine::pairing::{reseed_groups, ReseedOptions};
use crate::error::EngineResult;
use crate::models::tournament::{
    MatchResult, Rain, RoundConditions, TournamentFormat, TournamentStatus,
};
use crate::models::TournamentId;
use crate::store::Store;

/// Weather for a round: mostly benign, occasionally nasty.
pub fn draw_conditions(rng: &mut impl Rng) -> RoundConditions {
    let wind_mph = rng.gen_range(0.0..18.0);
    let roll: f64 = rng.gen();
    let rain = if roll < 0.70 {
        Rain::None
    } else if roll < 0.90 {
        Rain::Light
    } else {
        Rain::Heavy
    };
    RoundConditions { wind_mph, rain }
}

/// Archive this round's match-play results into session_history.
///
/// Per group, each hole 1..18 goes to the side with the lower minimum
/// strokes; the archive entry is replaced wholesale, so repeated
/// rollover checks stay idempotent.
pub fn archive_match_results(store: &mut Store, tournament: TournamentId) -> EngineResult<()> {
    let round = store.tournament(tournament)?.current_round;

    let mut archived = Vec::new();
    for gid in store.group_ids_for(tournament) {
        let member_ids = store.member_entry_ids(gid);
        let usa: Vec<_> = member_ids
            .iter()
            .copied()
            .filter(|e| store.entries[e].team == "USA")
            .collect();
        let eur: Vec<_> = member_ids
            .iter()
            .copied()
            .filter(|e| store.entries[e].team != "USA")
            .collect();

        let side_min = |side: &[crate::models::EntryId], hole: u8| -> Option<u8> {
            side.iter()
                .filter_map(|e| store.result_for(*e, round, hole))
                .map(|r| r.strokes)
                .min()
        };

        let mut usa_holes = 0u8;
        let mut eur_holes = 0u8;
        for hole in 1..=18u8 {
            match (side_min(&usa, hole), side_min(&eur, hole)) {
                (Some(u), Some(e)) if u < e => usa_holes += 1,
                (Some(u), Some(e)) if e < u => eur_holes += 1,
                _ => {}
            }
        }

        let diff = usa_holes.abs_diff(eur_holes);
        let (winner, score) = if usa_holes > eur_holes {
            ("USA".to_string(), format!("{} UP", diff))
        } else if eur_holes > usa_holes {
            ("EUR".to_string(), format!("{} UP", diff))
        } else {
            ("Halved".to_string(), "Halved".to_string())
        };

        let names = |side: &[crate::models::EntryId]| -> Vec<String> {
            side.iter().map(|e| store.entries[e].display_name.clone()).collect()
        };

        archived.push(MatchResult {
            group_id: gid,
            winner,
            margin: diff,
            score,
            usa_names: names(&usa),
            eur_names: names(&eur),
        });
    }

    let t = store.tournament_mut(tournament)?;
    t.session_history.insert(format!("R{}", round), archived);
    Ok(())
}

/// Advance the tournament when every group has finished the round.
///
/// Callers are expected to have checked the all-finished condition; this
/// re-checks and no-ops otherwise, so stray calls are harmless.
pub fn rollover_if_complete(
    store: &mut Store,
    config: &EngineConfig,
    tournament: TournamentId,
    rng: &mut impl Rng,
) -> EngineResult<()> {
    let group_ids = store.group_ids_for(tournament);
    if group_ids.is_empty() || group_ids.iter().any(|g| !store.groups[g].is_finished) {
        return Ok(());
    }

    let (format, round, cut_applied) = {
        let t = store.tournament(tournament)?;
        (t.format, t.current_round, t.cut_applied)
    };

    if format == TournamentFormat::Match {
        archive_match_results(store, tournament)?;
    }

    if round == 2 && !cut_applied {
        apply_cut(store, tournament)?;
    }

    if round < 4 {
        let now = round + 1;
        {
            let t = store.tournament_mut(tournament)?;
            t.current_round = now;
            let conditions = draw_conditions(rng);
            t.round_conditions.insert(now, conditions);
        }
        info!("tournament {} rolls into round {}", tournament, now);

        match format {
            TournamentFormat::Match => {
                if now <= 2 {
                    reseed_groups(
                        store,
                        config,
                        tournament,
                        &ReseedOptions {
                            split_tees: false,
                            group_size: 2,
                            leaders_last: false,
                            invert_split: false,
                            playoff: false,
                        },
                        rng,
                    )?;
                } else {
                    // Two-day Ryder Cup: there is no round 3.
                    store.tournament_mut(tournament)?.status = TournamentStatus::Finished;
                }
            }
            TournamentFormat::Stroke => {
                if now <= 2 {
                    reseed_groups(
                        store,
                        config,
                        tournament,
                        &ReseedOptions {
                            split_tees: true,
                            group_size: 4,
                            leaders_last: false,
                            invert_split: now == 2,
                            playoff: false,
                        },
                        rng,
                    )?;
                } else {
                    reseed_groups(
                        store,
                        config,
                        tournament,
                        &ReseedOptions {
                            split_tees: false,
                            group_size: 2,
                            leaders_last: true,
                            invert_split: false,
                            playoff: false,
                        },
                        rng,
                    )?;
                }
            }
        }

        recompute_positions(store, tournament)?;
        return Ok(());
    }

    // Round 4 (or a playoff round) just finished.
    if format == TournamentFormat::Match {
        store.tournament_mut(tournament)?.status = TournamentStatus::Finished;
        return Ok(());
    }

    let winners: Vec<_> = store
        .entry_ids_for(tournament)
        .into_iter()
        .filter(|e| store.entries[e].position == Some(1))
        .collect();

    if winners.len() > 1 {
        let next_round = round + 1;
        {
            let t = store.tournament_mut(tournament)?;
            t.status = TournamentStatus::Playoff;
            t.current_round = next_round;
            let conditions = draw_conditions(rng);
            t.round_conditions.insert(next_round, conditions);
        }
        info!(
            "tournament {} heads to a {}-player playoff",
            tournament,
            winners.len()
        );
        reseed_groups(
            store,
            config,
            tournament,
            &ReseedOptions {
                split_tees: false,
                group_size: winners.len(),
                leaders_last: false,
                invert_split: false,
                playoff: true,
            },
            rng,
        )?;
        recompute_positions(store, tournament)?;
    } else {
        store.tournament_mut(tournament)?.status = TournamentStatus::Finished;
        info!("tournament {} finished", tournament);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::course::Course;
    use crate::models::golfer::Handedness;
    use crate::models::tournament::{
        Group, HoleResult, Tournament, TournamentEntry, TournamentStatus,
    };
    use crate::models::{CourseId, EntryId, GroupId, ResultId, TournamentId};
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn setup(store: &mut Store, format: TournamentFormat, round: u8) -> TournamentId {
        let course = store.add_course(Course {
            id: CourseId(0),
            name: "C".to_string(),
            location: String::new(),
            difficulty_rating: 7.5,
            greens_speed: 10.0,
            fairway_firmness: 5.0,
            rough_severity: 5.0,
        });
        let t0 = Utc.with_ymd_and_hms(2025, 6, 12, 12, 30, 0).unwrap();
        store.add_tournament(Tournament {
            id: TournamentId(0),
            name: "T".to_string(),
            course,
            status: TournamentStatus::InProgress,
            format,
            start_time: t0,
            current_time: t0,
            current_round: round,
            cut_size: 65,
            cut_applied: false,
            projected_cut_score: None,
            session_history: BTreeMap::new(),
            round_conditions: BTreeMap::new(),
        })
    }

    fn add_entry(
        store: &mut Store,
        tid: TournamentId,
        name: &str,
        team: &str,
        total: i32,
        position: Option<usize>,
    ) -> EntryId {
        store.add_entry(TournamentEntry {
            id: EntryId(0),
            tournament: tid,
            golfer: None,
            display_name: name.to_string(),
            is_human: false,
            team: team.to_string(),
            total_strokes: 0,
            tournament_strokes: total,
            thru_hole: 18,
            position,
            cut: false,
            sim_state: BTreeMap::new(),
            country: "USA".to_string(),
            handedness: Handedness::Right,
            avatar_color: String::new(),
        })
    }

    fn finished_group(store: &mut Store, tid: TournamentId, members: &[EntryId]) -> GroupId {
        let now = store.tournament(tid).unwrap().current_time;
        let gid = store.add_group(Group {
            id: GroupId(0),
            tournament: tid,
            tee_time: now,
            wave: 1,
            start_hole: 1,
            current_hole: 18,
            holes_completed: 18,
            next_action_time: Some(now),
            is_finished: true,
        });
        for m in members {
            store.add_member(gid, *m);
        }
        gid
    }

    fn record(store: &mut Store, entry: EntryId, round: u8, hole: u8, strokes: u8) {
        let now = Utc.with_ymd_and_hms(2025, 6, 12, 15, 0, 0).unwrap();
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
    fn test_draw_conditions_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let c = draw_conditions(&mut rng);
            assert!((0.0..18.0).contains(&c.wind_mph));
        }
    }

    #[test]
    fn test_match_archival_counts_holes() {
        let mut store = Store::new();
        let tid = setup(&mut store, TournamentFormat::Match, 1);
        let u = add_entry(&mut store, tid, "Sam", "USA", 0, None);
        let e = add_entry(&mut store, tid, "Rory", "EUR", 0, None);
        let gid = finished_group(&mut store, tid, &[u, e]);

        // USA wins holes 1-10, EUR wins 11-14, halve the rest.
        for hole in 1..=18u8 {
            let (us, es) = if hole <= 10 {
                (4, 5)
            } else if hole <= 14 {
                (5, 4)
            } else {
                (4, 4)
            };
            record(&mut store, u, 1, hole, us);
            record(&mut store, e, 1, hole, es);
        }

        archive_match_results(&mut store, tid).unwrap();

        let t = store.tournament(tid).unwrap();
        let session = t.session_history.get("R1").unwrap();
        assert_eq!(session.len(), 1);
        let m = &session[0];
        assert_eq!(m.group_id, gid);
        assert_eq!(m.winner, "USA");
        assert_eq!(m.margin, 6);
        assert_eq!(m.score, "6 UP");
        assert_eq!(m.usa_names, vec!["Sam".to_string()]);
        assert_eq!(m.eur_names, vec!["Rory".to_string()]);
    }

    #[test]
    fn test_match_archival_halved() {
        let mut store = Store::new();
        let tid = setup(&mut store, TournamentFormat::Match, 1);
        let u = add_entry(&mut store, tid, "Sam", "USA", 0, None);
        let e = add_entry(&mut store, tid, "Rory", "EUR", 0, None);
        finished_group(&mut store, tid, &[u, e]);

        for hole in 1..=18u8 {
            record(&mut store, u, 1, hole, 4);
            record(&mut store, e, 1, hole, 4);
        }

        archive_match_results(&mut store, tid).unwrap();
        let t = store.tournament(tid).unwrap();
        let m = &t.session_history.get("R1").unwrap()[0];
        assert_eq!(m.winner, "Halved");
        assert_eq!(m.score, "Halved");
        assert_eq!(m.margin, 0);
    }

    #[test]
    fn test_match_finishes_after_round_two() {
        let mut store = Store::new();
        let tid = setup(&mut store, TournamentFormat::Match, 2);
        let u = add_entry(&mut store, tid, "Sam", "USA", 140, None);
        let e = add_entry(&mut store, tid, "Rory", "EUR", 141, None);
        finished_group(&mut store, tid, &[u, e]);
        for hole in 1..=18u8 {
            record(&mut store, u, 2, hole, 4);
            record(&mut store, e, 2, hole, 4);
        }

        let config = EngineConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        rollover_if_complete(&mut store, &config, tid, &mut rng).unwrap();

        let t = store.tournament(tid).unwrap();
        assert_eq!(t.current_round, 3);
        assert_eq!(t.status, TournamentStatus::Finished);
        assert!(t.session_history.contains_key("R2"));
        // Small match field: the round-2 cut pass only latches.
        assert!(t.cut_applied);
    }

    #[test]
    fn test_stroke_round_one_rolls_into_inverted_split() {
        let mut store = Store::new();
        let tid = setup(&mut store, TournamentFormat::Stroke, 1);
        let entries: Vec<EntryId> = (0..8)
            .map(|i| add_entry(&mut store, tid, &format!("B{}", i), "", 70 + i as i32, None))
            .collect();
        for chunk in entries.chunks(4) {
            finished_group(&mut store, tid, chunk);
        }
        for e in &entries {
            record(&mut store, *e, 1, 1, 4);
        }

        let config = EngineConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        rollover_if_complete(&mut store, &config, tid, &mut rng).unwrap();

        let t = store.tournament(tid).unwrap();
        assert_eq!(t.current_round, 2);
        assert!(t.round_conditions.contains_key(&2));
        assert!(!t.cut_applied);

        // Reseeded groups exist, unfinished, first wave off the tenth tee.
        let gids = store.group_ids_for(tid);
        assert_eq!(gids.len(), 2);
        assert!(gids.iter().all(|g| !store.groups[g].is_finished));
        assert_eq!(store.groups[&gids[0]].start_hole, 10);
    }

    #[test]
    fn test_round_four_tie_goes_to_playoff() {
        let mut store = Store::new();
        let tid = setup(&mut store, TournamentFormat::Stroke, 4);
        store.tournament_mut(tid).unwrap().cut_applied = true;
        let a = add_entry(&mut store, tid, "A", "", 272, Some(1));
        let b = add_entry(&mut store, tid, "B", "", 272, Some(1));
        let c = add_entry(&mut store, tid, "C", "", 275, Some(3));
        finished_group(&mut store, tid, &[a, b]);
        finished_group(&mut store, tid, &[c]);

        let config = EngineConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        rollover_if_complete(&mut store, &config, tid, &mut rng).unwrap();

        let t = store.tournament(tid).unwrap();
        assert_eq!(t.status, TournamentStatus::Playoff);
        assert_eq!(t.current_round, 5);

        let gids = store.group_ids_for(tid);
        assert_eq!(gids.len(), 1);
        let members = store.member_entry_ids(gids[0]);
        assert_eq!(members.len(), 2);
        assert!(!members.contains(&c));
    }

    #[test]
    fn test_round_four_unique_leader_finishes() {
        let mut store = Store::new();
        let tid = setup(&mut store, TournamentFormat::Stroke, 4);
        store.tournament_mut(tid).unwrap().cut_applied = true;
        let a = add_entry(&mut store, tid, "A", "", 270, Some(1));
        let b = add_entry(&mut store, tid, "B", "", 272, Some(2));
        finished_group(&mut store, tid, &[a, b]);

        let config = EngineConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        rollover_if_complete(&mut store, &config, tid, &mut rng).unwrap();

        let t = store.tournament(tid).unwrap();
        assert_eq!(t.status, TournamentStatus::Finished);
        assert_eq!(t.current_round, 4);
    }

    #[test]
    fn test_rollover_noop_while_groups_running() {
        let mut store = Store::new();
        let tid = setup(&mut store, TournamentFormat::Stroke, 1);
        let a = add_entry(&mut store, tid, "A", "", 0, None);
        let gid = finished_group(&mut store, tid, &[a]);
        store.groups.get_mut(&gid).unwrap().is_finished = false;

        let config = EngineConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        rollover_if_complete(&mut store, &config, tid, &mut rng).unwrap();

        assert_eq!(store.tournament(tid).unwrap().current_round, 1);
    }
}
