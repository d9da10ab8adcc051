// Pairing and reseeding
//
// Builds the groups for a round: the round-1 draw at creation time, the
// per-round reseed at rollover (split tees, weekend twosomes with leaders
// last, playoff groups), and the pre-play match shuffle. Group emission is
// shared: tee-time ladder, split-tee waves, human tee-time equalization
// and the per-round entry reset.

use chrono::Duration;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::tournament::{Group, TournamentFormat};
use crate::models::{EntryId, GroupId, TournamentId};
use crate::store::Store;

/// Layout options for one round of groups.
#[derive(Debug, Clone, Copy)]
pub struct GroupLayout {
    pub split_tees: bool,
    pub group_size: usize,
    pub invert_split: bool,
}

/// Field-ordering options for a reseed.
#[derive(Debug, Clone, Copy)]
pub struct ReseedOptions {
    pub split_tees: bool,
    pub group_size: usize,
    pub leaders_last: bool,
    pub invert_split: bool,
    pub playoff: bool,
}

/// Per-entry data the orderers need, captured up front to keep borrow
/// lifetimes out of the shuffling code.
#[derive(Debug, Clone)]
struct FieldEntry {
    id: EntryId,
    prior_total: i32,
    is_human: bool,
    team: String,
}

fn field_snapshot(store: &Store, ids: &[EntryId]) -> Vec<FieldEntry> {
    ids.iter()
        .filter_map(|id| store.entries.get(id))
        .map(|e| FieldEntry {
            id: e.id,
            prior_total: e.tournament_strokes,
            is_human: e.is_human,
            team: e.team.clone(),
        })
        .collect()
}

/// Interleave USA and EUR lists for match play: (U, E) twosomes or
/// (U, U, E, E) fourballs.
fn interleave_teams(usa: &[FieldEntry], eur: &[FieldEntry], group_size: usize) -> Vec<EntryId> {
    let mut ordered = Vec::with_capacity(usa.len() + eur.len());
    if group_size >= 4 {
        let mut i = 0;
        while i < usa.len().max(eur.len()) {
            for side in [usa, eur] {
                if i < side.len() {
                    ordered.push(side[i].id);
                }
                if i + 1 < side.len() {
                    ordered.push(side[i + 1].id);
                }
            }
            i += 2;
        }
    } else {
        for i in 0..usa.len().max(eur.len()) {
            if i < usa.len() {
                ordered.push(usa[i].id);
            }
            if i < eur.len() {
                ordered.push(eur[i].id);
            }
        }
    }
    ordered
}

/// Order the round-1 field at creation time.
///
/// Match play pairs the sides in id order. Stroke play shuffles the bots
/// and drops the human block at a group boundary in the middle third of
/// the field, so humans tee off together mid-draw.
pub fn initial_draw(
    store: &Store,
    tournament: TournamentId,
    format: TournamentFormat,
    group_size: usize,
    rng: &mut impl Rng,
) -> Vec<EntryId> {
    let ids = store.entry_ids_for(tournament);
    let field = field_snapshot(store, &ids);

    match format {
        TournamentFormat::Match => {
            let usa: Vec<FieldEntry> = field.iter().filter(|e| e.team == "USA").cloned().collect();
            let eur: Vec<FieldEntry> = field.iter().filter(|e| e.team != "USA").cloned().collect();
            interleave_teams(&usa, &eur, group_size)
        }
        TournamentFormat::Stroke => {
            let humans: Vec<EntryId> = field.iter().filter(|e| e.is_human).map(|e| e.id).collect();
            let mut bots: Vec<EntryId> = field.iter().filter(|e| !e.is_human).map(|e| e.id).collect();
            bots.shuffle(rng);

            if humans.is_empty() {
                return bots;
            }

            let total_groups = (bots.len() + humans.len() + group_size - 1) / group_size;
            let lo = total_groups / 3;
            let hi = (2 * total_groups / 3).max(lo);
            let human_group = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
            let at = (human_group * group_size).min(bots.len());

            let mut ordered = Vec::with_capacity(bots.len() + humans.len());
            ordered.extend_from_slice(&bots[..at]);
            ordered.extend_from_slice(&humans);
            ordered.extend_from_slice(&bots[at..]);
            ordered
        }
    }
}

/// Order the field for a reseed per the round options.
fn reseed_order(
    store: &Store,
    tournament: TournamentId,
    opts: &ReseedOptions,
    rng: &mut impl Rng,
) -> EngineResult<Vec<EntryId>> {
    let t = store.tournament(tournament)?;
    let all_ids = store.entry_ids_for(tournament);

    // Choose the field: playoff winners, post-cut survivors, or everyone.
    let ids: Vec<EntryId> = if opts.playoff {
        all_ids
            .into_iter()
            .filter(|id| store.entries[id].position == Some(1))
            .collect()
    } else if t.cut_applied && t.current_round >= 3 {
        all_ids
            .into_iter()
            .filter(|id| !store.entries[id].cut)
            .collect()
    } else {
        all_ids
    };

    let mut field = field_snapshot(store, &ids);

    if opts.playoff || opts.leaders_last {
        // Best scores tee off last.
        field.sort_by_key(|e| (e.prior_total, e.id));
        field.reverse();

        let humans: Vec<FieldEntry> = field.iter().filter(|e| e.is_human).cloned().collect();
        let bots: Vec<FieldEntry> = field.iter().filter(|e| !e.is_human).cloned().collect();
        if humans.is_empty() {
            return Ok(bots.into_iter().map(|e| e.id).collect());
        }

        // Slot the whole human block where its best score belongs.
        let best_human = humans.iter().map(|h| h.prior_total).min().unwrap();
        let at = bots
            .iter()
            .position(|b| b.prior_total <= best_human)
            .unwrap_or(bots.len());

        let mut ordered: Vec<EntryId> = bots[..at].iter().map(|e| e.id).collect();
        ordered.extend(humans.iter().map(|e| e.id));
        ordered.extend(bots[at..].iter().map(|e| e.id));
        Ok(ordered)
    } else if t.format == TournamentFormat::Match {
        let mut usa: Vec<FieldEntry> = field.iter().filter(|e| e.team == "USA").cloned().collect();
        let mut eur: Vec<FieldEntry> = field.iter().filter(|e| e.team != "USA").cloned().collect();
        usa.shuffle(rng);
        eur.shuffle(rng);
        Ok(interleave_teams(&usa, &eur, opts.group_size))
    } else {
        field.shuffle(rng);

        // Pack humans into as few groups as possible: full human chunks,
        // the last one topped up with bots from the head of the draw.
        let humans: Vec<EntryId> = field.iter().filter(|e| e.is_human).map(|e| e.id).collect();
        let mut bots: Vec<EntryId> = field.iter().filter(|e| !e.is_human).map(|e| e.id).collect();
        if humans.is_empty() {
            return Ok(bots);
        }

        let mut block = humans;
        while block.len() % opts.group_size != 0 && !bots.is_empty() {
            block.push(bots.remove(0));
        }
        block.extend(bots);
        Ok(block)
    }
}

/// Emit groups for an ordered field and reset per-round entry state.
///
/// Split-tee rounds alternate the first and tenth tee (swapped when
/// `invert_split`), sharing each tee-time slot between the two waves.
/// Afterwards every human-containing group is pulled to the earliest
/// human tee time so humans play simultaneously.
pub fn build_groups(
    store: &mut Store,
    config: &EngineConfig,
    tournament: TournamentId,
    ordered: &[EntryId],
    layout: &GroupLayout,
) -> EngineResult<Vec<GroupId>> {
    let t = store.tournament(tournament)?;
    let start_time = t.current_time;

    let mut created = Vec::new();
    for (gi, chunk) in ordered.chunks(layout.group_size.max(1)).enumerate() {
        let (start_hole, wave, time_slot) = if layout.split_tees {
            let mut start_hole = if gi % 2 == 0 { 1 } else { 10 };
            if layout.invert_split {
                start_hole = if start_hole == 1 { 10 } else { 1 };
            }
            let wave = if start_hole == 1 { 1 } else { 2 };
            (start_hole, wave, (gi / 2) as i64)
        } else {
            (1, 1, gi as i64)
        };

        let tee_time = start_time + Duration::minutes(config.tee_interval_minutes * time_slot);
        let gid = store.add_group(Group {
            id: GroupId(0),
            tournament,
            tee_time,
            wave,
            start_hole,
            current_hole: start_hole,
            holes_completed: 0,
            next_action_time: Some(tee_time),
            is_finished: false,
        });
        for entry in chunk {
            store.add_member(gid, *entry);
        }
        created.push(gid);
    }

    // Humans play at the same time: pull every human group to the
    // earliest human tee time.
    let human_groups: Vec<GroupId> = created
        .iter()
        .copied()
        .filter(|gid| store.group_contains_human(*gid))
        .collect();
    if !human_groups.is_empty() {
        let min_tee = human_groups
            .iter()
            .map(|gid| store.groups[gid].tee_time)
            .min()
            .unwrap();
        for gid in &human_groups {
            let g = store.groups.get_mut(gid).unwrap();
            g.tee_time = min_tee;
            g.next_action_time = Some(min_tee);
        }
    }

    // Fresh round: reset the per-round display fields.
    let entry_ids = store.entry_ids_for(tournament);
    for eid in entry_ids {
        let e = store.entry_mut(eid)?;
        e.thru_hole = 0;
        e.total_strokes = 0;
        e.position = None;
    }

    debug!(
        "built {} groups for tournament {} (size {}, split {})",
        created.len(),
        tournament,
        layout.group_size,
        layout.split_tees
    );
    Ok(created)
}

/// Tear down this round's groups and build the next round's.
pub fn reseed_groups(
    store: &mut Store,
    config: &EngineConfig,
    tournament: TournamentId,
    opts: &ReseedOptions,
    rng: &mut impl Rng,
) -> EngineResult<()> {
    store.delete_groups_for(tournament);
    let ordered = reseed_order(store, tournament, opts, rng)?;
    build_groups(
        store,
        config,
        tournament,
        &ordered,
        &GroupLayout {
            split_tees: opts.split_tees,
            group_size: opts.group_size,
            invert_split: opts.invert_split,
        },
    )?;
    Ok(())
}

/// Re-shuffle match pairings in place, keeping the group skeleton
/// (tee times, sizes) intact. Only legal before anyone has played a hole.
pub fn shuffle_pairings(
    store: &mut Store,
    tournament: TournamentId,
    rng: &mut impl Rng,
) -> EngineResult<()> {
    let t = store.tournament(tournament)?;
    if t.format != TournamentFormat::Match {
        return Err(EngineError::validation(
            "shuffle-pairings only applies to match play",
        ));
    }

    let group_ids = store.group_ids_for(tournament);
    if group_ids
        .iter()
        .any(|gid| store.groups[gid].holes_completed > 0)
    {
        return Err(EngineError::validation(
            "cannot shuffle pairings after play has started",
        ));
    }

    let ids = store.entry_ids_for(tournament);
    let field = field_snapshot(store, &ids);
    let mut usa: Vec<EntryId> = field.iter().filter(|e| e.team == "USA").map(|e| e.id).collect();
    let mut eur: Vec<EntryId> = field.iter().filter(|e| e.team != "USA").map(|e| e.id).collect();
    usa.shuffle(rng);
    eur.shuffle(rng);

    let mut usa_iter = usa.into_iter();
    let mut eur_iter = eur.into_iter();
    for gid in group_ids {
        let size = store.member_entry_ids(gid).len();
        let per_side = size / 2;

        store.members.retain(|_, m| m.group != gid);
        for _ in 0..per_side {
            if let Some(e) = usa_iter.next() {
                store.add_member(gid, e);
            }
        }
        for _ in 0..per_side {
            if let Some(e) = eur_iter.next() {
                store.add_member(gid, e);
            }
        }
    }
    Ok(())
}
