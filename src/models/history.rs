//! Pairing history: who has already met whom in a tournament.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{PlayerId, Round};

/// Append-only record of pairings and byes handed out in a tournament.
///
/// Pairs are unordered; they are stored with the smaller id first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingHistory {
    #[serde(default)]
    pairs: BTreeSet<(PlayerId, PlayerId)>,

    #[serde(default)]
    byes: BTreeSet<PlayerId>,
}

fn key(a: &PlayerId, b: &PlayerId) -> (PlayerId, PlayerId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

impl PairingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember that `a` and `b` have been paired.
    pub fn record_pair(&mut self, a: &PlayerId, b: &PlayerId) {
        self.pairs.insert(key(a, b));
    }

    /// Remember that `player` received a bye.
    pub fn record_bye(&mut self, player: &PlayerId) {
        self.byes.insert(player.clone());
    }

    pub fn have_played(&self, a: &PlayerId, b: &PlayerId) -> bool {
        self.pairs.contains(&key(a, b))
    }

    pub fn had_bye(&self, player: &PlayerId) -> bool {
        self.byes.contains(player)
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Remember every pairing and the bye of `round`.
    pub fn record_round(&mut self, round: &Round) {
        for (a, b) in round.pairs() {
            self.record_pair(a, b);
        }
        if let Some(player) = round.bye() {
            self.record_bye(player);
        }
    }
}
