// Monte-Carlo win probabilities
//
// Each contender's final score-to-par is modeled as Normal(exp, sigma)
// where exp extrapolates the current score over the remaining holes by a
// skill-derived per-hole adjustment, and sigma widens with holes left.
// Trials run in parallel; each trial seeds its own RNG from the base
// seed, so a pinned seed gives identical probabilities on every run.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;

use crate::error::EngineResult;
use crate::models::{EntryId, TournamentId};
use crate::store::Store;

/// Scores within this margin of the trial minimum split the win.
const TIE_EPSILON: f64 = 0.01;
/// Contenders further than this from the best expected score are pruned.
const CONTENDER_WINDOW: f64 = 15.0;
/// Assumed overall rating for human entries.
const HUMAN_OVERALL: f64 = 92.0;

#[derive(Debug, Clone)]
struct Contender {
    id: EntryId,
    exp: f64,
    sigma: f64,
}

/// Estimate each live entry's share of tournament wins.
///
/// Cut players are excluded. Probabilities below 0.1% are dropped from
/// the result, so the map stays small even for big fields.
pub fn win_probabilities(
    store: &Store,
    tournament: TournamentId,
    trials: usize,
    seed: u64,
) -> EngineResult<BTreeMap<EntryId, f64>> {
    let t = store.tournament(tournament)?;
    let pars: std::collections::HashMap<u8, u8> = store
        .holes_for_course(t.course)
        .iter()
        .map(|h| (h.number, h.par))
        .collect();

    let total_holes = 4 * 18;
    let mut players: Vec<Contender> = Vec::new();

    for eid in store.entry_ids_for(tournament) {
        let e = store.entry(eid)?;
        if t.cut_applied && e.cut {
            continue;
        }

        let results = store.results_for_entry(eid);
        let strokes: i32 = results.iter().map(|r| r.strokes as i32).sum();
        let par: i32 = results
            .iter()
            .map(|r| pars.get(&r.hole_number).copied().unwrap_or(4) as i32)
            .sum();
        let completed = results.len() as i32;
        let score_to_par = (strokes - par) as f64;
        let remaining = (total_holes - completed).max(0);

        let overall = if e.is_human {
            HUMAN_OVERALL
        } else if let Some(gid) = e.golfer {
            store.golfer(gid)?.overall() as f64
        } else {
            75.0
        };

        let skill_adj = 0.10 - 0.005 * (overall - 50.0);
        let exp = score_to_par + remaining as f64 * skill_adj;
        let sigma = if remaining > 0 {
            0.45 * (remaining as f64).sqrt()
        } else {
            0.001
        };

        players.push(Contender { id: eid, exp, sigma });
    }

    if players.is_empty() {
        return Ok(BTreeMap::new());
    }

    players.sort_by(|a, b| a.exp.partial_cmp(&b.exp).unwrap());
    let leader_exp = players[0].exp;
    let contenders: Vec<Contender> = players
        .into_iter()
        .filter(|p| p.exp < leader_exp + CONTENDER_WINDOW)
        .collect();

    let win_shares: Vec<f64> = (0..trials)
        .into_par_iter()
        .map(|trial| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(trial as u64));
            let mut shares = vec![0.0f64; contenders.len()];

            let mut best = f64::MAX;
            let mut winners: Vec<usize> = Vec::new();
            for (i, p) in contenders.iter().enumerate() {
                let score = Normal::new(p.exp, p.sigma)
                    .map(|n| n.sample(&mut rng))
                    .unwrap_or(p.exp);
                if score < best - TIE_EPSILON {
                    best = score;
                    winners.clear();
                    winners.push(i);
                } else if (score - best).abs() < TIE_EPSILON {
                    winners.push(i);
                    best = best.min(score);
                }
            }

            let share = 1.0 / winners.len() as f64;
            for w in winners {
                shares[w] += share;
            }
            shares
        })
        .reduce(
            || vec![0.0f64; contenders.len()],
            |mut acc, shares| {
                for (a, s) in acc.iter_mut().zip(shares) {
                    *a += s;
                }
                acc
            },
        );

    let mut out = BTreeMap::new();
    for (p, wins) in contenders.iter().zip(win_shares) {
        let prob = wins / trials as f64;
        if prob > 0.001 {
            out.insert(p.id, prob);
        }
    }
    Ok(out)
}
