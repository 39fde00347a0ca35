//! Rounds of a tournament.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Match, PlayerId};

/// Position of a match inside a tournament: round number (1-based) and
/// board index within that round (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchRef {
    pub round: u32,
    pub index: usize,
}

impl MatchRef {
    pub fn new(round: u32, index: usize) -> Self {
        Self { round, index }
    }
}

/// A set of matches generated together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// Sequence number, starting at 1
    pub number: u32,

    /// Matches in display order
    matches: Vec<Match>,

    /// Set once by the tournament when the operator confirms the round
    confirmed: bool,

    pub started_at: DateTime<Utc>,

    pub ended_at: Option<DateTime<Utc>>,
}

impl Round {
    pub fn new(number: u32, matches: Vec<Match>) -> Self {
        Self {
            number,
            matches,
            confirmed: false,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Display name, e.g. "Round 2".
    pub fn name(&self) -> String {
        format!("Round {}", self.number)
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub(crate) fn match_mut(&mut self, index: usize) -> Option<&mut Match> {
        self.matches.get_mut(index)
    }

    /// True when every match holds a result.
    pub fn is_complete(&self) -> bool {
        self.matches.iter().all(Match::is_resolved)
    }

    /// Number of matches still waiting for a result.
    pub fn pending(&self) -> usize {
        self.matches.iter().filter(|m| !m.is_resolved()).count()
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub(crate) fn confirm(&mut self) {
        self.confirmed = true;
        self.ended_at = Some(Utc::now());
    }

    /// The bye of this round, if any.
    pub fn bye(&self) -> Option<&PlayerId> {
        self.matches
            .iter()
            .find(|m| m.is_bye())
            .map(|m| m.player_a())
    }

    /// Non-bye pairings of this round.
    pub fn pairs(&self) -> impl Iterator<Item = (&PlayerId, &PlayerId)> {
        self.matches
            .iter()
            .filter_map(|m| m.player_b().map(|b| (m.player_a(), b)))
    }
}
