// The 36-hole cut
//
// After round 2 the field is trimmed to cut_size by rounds-1-and-2 raw
// strokes. Humans are never cut. cut_applied is a one-shot latch: once
// set, the cut flags are frozen and repeat rollovers are no-ops.

use log::info;

use crate::error::EngineResult;
use crate::models::TournamentId;
use crate::store::Store;

/// Entries with no rounds-1-2 results sort to the bottom.
const MISSING_TOTAL: i32 = 10_000;

/// Apply the cut for a tournament. Idempotent via the cut_applied latch.
pub fn apply_cut(store: &mut Store, tournament: TournamentId) -> EngineResult<()> {
    let cut_size = store.tournament(tournament)?.cut_size;

    let mut scored: Vec<(i32, crate::models::EntryId)> = store
        .entry_ids_for(tournament)
        .into_iter()
        .map(|eid| (store.r12_total(eid).unwrap_or(MISSING_TOTAL), eid))
        .collect();
    scored.sort_by_key(|&(total, id)| (total, id));

    if scored.len() <= cut_size {
        // Everyone plays the weekend; just latch.
        store.tournament_mut(tournament)?.cut_applied = true;
        return Ok(());
    }

    let cut_score = scored[cut_size - 1].0;
    let mut survivors = 0usize;
    for (total, eid) in &scored {
        let e = store.entry_mut(*eid)?;
        e.cut = !e.is_human && *total > cut_score;
        if !e.cut {
            survivors += 1;
        }
    }

    store.tournament_mut(tournament)?.cut_applied = true;
    info!(
        "cut applied for tournament {}: line {} strokes, {} survive",
        tournament, cut_score, survivors
    );
    Ok(())
}
