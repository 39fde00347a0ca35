//! Round pairing.
//!
//! Builds the matches of a round from the current scores:
//! 1. Order players by score, shuffling inside each equal-score bucket
//! 2. Hand the bye (odd rosters) to the lowest-placed player without one
//! 3. Pair neighbours in that order, repairing around previous pairings
//! 4. Fall back to greedy proximity pairing if no repeat-free round exists
//!
//! The random source is passed in, so tests can seed it.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::models::{Match, PairingHistory, PlayerId, Round};

/// Upper bound on candidate pairings tried by one repeat-free search
/// (per bye candidate on odd rosters) before falling back to greedy pairing.
pub const SEARCH_BUDGET: usize = 100_000;

type Pair = (PlayerId, PlayerId);

/// Generate round `number` for `players`.
///
/// Players missing from `scores` count as having zero points. The returned
/// round is not recorded in `history`; the caller does that when it keeps
/// the round.
pub fn generate_round<R: Rng + ?Sized>(
    players: &[PlayerId],
    scores: &HashMap<PlayerId, f64>,
    history: &PairingHistory,
    number: u32,
    rng: &mut R,
) -> Round {
    let ordered = order_by_score(players, scores, rng);

    if ordered.len() % 2 == 0 {
        let pairs = match pair_without_repeats(&ordered, history) {
            Some(pairs) => pairs,
            None => {
                warn!(round = number, "No repeat-free pairing found, allowing rematches");
                pair_greedily(&ordered, history)
            }
        };
        return assemble(number, pairs, None);
    }

    let candidates = bye_candidates(&ordered, history);
    for &index in &candidates {
        let rest = without(&ordered, index);
        if let Some(pairs) = pair_without_repeats(&rest, history) {
            return assemble(number, pairs, Some(ordered[index].clone()));
        }
    }

    // Odd roster always yields at least one candidate.
    let index = candidates[0];
    warn!(round = number, "No repeat-free pairing found, allowing rematches");
    let rest = without(&ordered, index);
    assemble(
        number,
        pair_greedily(&rest, history),
        Some(ordered[index].clone()),
    )
}

fn score_of(scores: &HashMap<PlayerId, f64>, player: &PlayerId) -> f64 {
    scores.get(player).copied().unwrap_or(0.0)
}

/// Descending by score; order inside an equal-score bucket is random.
fn order_by_score<R: Rng + ?Sized>(
    players: &[PlayerId],
    scores: &HashMap<PlayerId, f64>,
    rng: &mut R,
) -> Vec<PlayerId> {
    let mut ordered = players.to_vec();
    ordered.sort_by(|a, b| score_of(scores, b).total_cmp(&score_of(scores, a)));

    let mut start = 0;
    while start < ordered.len() {
        let bucket_score = score_of(scores, &ordered[start]);
        let end = ordered[start..]
            .iter()
            .position(|p| score_of(scores, p) != bucket_score)
            .map_or(ordered.len(), |offset| start + offset);
        ordered[start..end].shuffle(rng);
        start = end;
    }

    ordered
}

/// Indices eligible for the bye, lowest placed first. Players who already
/// had a bye are only considered when nobody else is left.
fn bye_candidates(ordered: &[PlayerId], history: &PairingHistory) -> Vec<usize> {
    let eligible: Vec<usize> = (0..ordered.len())
        .rev()
        .filter(|&i| !history.had_bye(&ordered[i]))
        .collect();

    if eligible.is_empty() {
        ordered.len().checked_sub(1).into_iter().collect()
    } else {
        eligible
    }
}

fn without(ordered: &[PlayerId], index: usize) -> Vec<PlayerId> {
    ordered
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != index)
        .map(|(_, p)| p.clone())
        .collect()
}

/// Pair the list in order, taking for each player the nearest opponent
/// they have not met and backtracking when a later player is stranded.
fn pair_without_repeats(ordered: &[PlayerId], history: &PairingHistory) -> Option<Vec<Pair>> {
    let mut pool = ordered.to_vec();
    let mut pairs = Vec::with_capacity(pool.len() / 2);
    let mut budget = SEARCH_BUDGET;
    if search(&mut pool, history, &mut budget, &mut pairs) {
        Some(pairs)
    } else {
        None
    }
}

fn search(
    pool: &mut Vec<PlayerId>,
    history: &PairingHistory,
    budget: &mut usize,
    pairs: &mut Vec<Pair>,
) -> bool {
    if pool.is_empty() {
        return true;
    }
    if has_stranded_player(pool, history) {
        return false;
    }

    let first = pool.remove(0);
    for j in 0..pool.len() {
        if *budget == 0 {
            break;
        }
        *budget -= 1;

        if history.have_played(&first, &pool[j]) {
            continue;
        }

        let opponent = pool.remove(j);
        pairs.push((first.clone(), opponent));
        if search(pool, history, budget, pairs) {
            return true;
        }
        if let Some((_, opponent)) = pairs.pop() {
            pool.insert(j, opponent);
        }
    }
    pool.insert(0, first);
    false
}

/// True when someone in `pool` has already met everyone else in it.
fn has_stranded_player(pool: &[PlayerId], history: &PairingHistory) -> bool {
    pool.iter()
        .any(|a| pool.iter().all(|b| a == b || history.have_played(a, b)))
}

/// Sequential pairing that prefers the nearest unmet opponent and otherwise
/// takes the nearest one, rematch or not.
fn pair_greedily(ordered: &[PlayerId], history: &PairingHistory) -> Vec<Pair> {
    let mut pool = ordered.to_vec();
    let mut pairs = Vec::with_capacity(pool.len() / 2);

    while pool.len() >= 2 {
        let first = pool.remove(0);
        let j = pool
            .iter()
            .position(|p| !history.have_played(&first, p))
            .unwrap_or(0);
        let opponent = pool.remove(j);
        pairs.push((first, opponent));
    }

    pairs
}

fn assemble(number: u32, pairs: Vec<Pair>, bye: Option<PlayerId>) -> Round {
    let mut matches: Vec<Match> = pairs.into_iter().map(|(a, b)| Match::new(a, b)).collect();
    if let Some(player) = bye {
        matches.push(Match::bye(player));
    }
    debug!(round = number, matches = matches.len(), "Generated round pairings");
    Round::new(number, matches)
}
