//! A single game between two players, or a bye.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::{IllegalTransition, InvalidReference, PlayerId, TournamentError};

/// Points for a win.
pub const WIN_POINTS: f64 = 1.0;
/// Points for a draw.
pub const DRAW_POINTS: f64 = 0.5;
/// Points for a loss.
pub const LOSS_POINTS: f64 = 0.0;
/// Points for a bye.
pub const BYE_POINTS: f64 = 1.0;

/// Stored result of one player in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultCode {
    Win,
    Loss,
    Draw,
    /// Unopposed slot, scored as a win
    Bye,
}

impl ResultCode {
    pub fn points(&self) -> f64 {
        match self {
            ResultCode::Win => WIN_POINTS,
            ResultCode::Loss => LOSS_POINTS,
            ResultCode::Draw => DRAW_POINTS,
            ResultCode::Bye => BYE_POINTS,
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultCode::Win => write!(f, "win"),
            ResultCode::Loss => write!(f, "loss"),
            ResultCode::Draw => write!(f, "draw"),
            ResultCode::Bye => write!(f, "bye"),
        }
    }
}

/// A result an operator can enter for a player. Byes are never entered by
/// hand, so they have no outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// The same game seen from the opponent's side.
    pub fn reversed(&self) -> Self {
        match self {
            Outcome::Win => Outcome::Loss,
            Outcome::Loss => Outcome::Win,
            Outcome::Draw => Outcome::Draw,
        }
    }

    pub fn code(&self) -> ResultCode {
        match self {
            Outcome::Win => ResultCode::Win,
            Outcome::Loss => ResultCode::Loss,
            Outcome::Draw => ResultCode::Draw,
        }
    }
}

/// Error parsing an outcome from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown result '{0}', expected win, loss or draw")]
pub struct ParseOutcomeError(String);

impl FromStr for Outcome {
    type Err = ParseOutcomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "win" | "w" | "1" | "1-0" => Ok(Outcome::Win),
            "loss" | "l" | "0" | "0-1" => Ok(Outcome::Loss),
            "draw" | "d" | "=" | "1/2" => Ok(Outcome::Draw),
            other => Err(ParseOutcomeError(other.to_string())),
        }
    }
}

/// One game of a round.
///
/// A match is either unset (no result for either side) or resolved (both
/// sides hold complementary results). A bye has no second player and is
/// resolved from the moment it is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    player_a: PlayerId,
    player_b: Option<PlayerId>,
    result_a: Option<ResultCode>,
    result_b: Option<ResultCode>,
    points_a: f64,
    points_b: f64,
}

impl Match {
    /// An unplayed game between two players.
    pub fn new(player_a: PlayerId, player_b: PlayerId) -> Self {
        Self {
            player_a,
            player_b: Some(player_b),
            result_a: None,
            result_b: None,
            points_a: 0.0,
            points_b: 0.0,
        }
    }

    /// A bye for `player`, already scored.
    pub fn bye(player: PlayerId) -> Self {
        Self {
            player_a: player,
            player_b: None,
            result_a: Some(ResultCode::Bye),
            result_b: None,
            points_a: BYE_POINTS,
            points_b: 0.0,
        }
    }

    pub fn player_a(&self) -> &PlayerId {
        &self.player_a
    }

    pub fn player_b(&self) -> Option<&PlayerId> {
        self.player_b.as_ref()
    }

    pub fn result_a(&self) -> Option<ResultCode> {
        self.result_a
    }

    pub fn result_b(&self) -> Option<ResultCode> {
        self.result_b
    }

    pub fn points_a(&self) -> f64 {
        self.points_a
    }

    pub fn points_b(&self) -> f64 {
        self.points_b
    }

    pub fn is_bye(&self) -> bool {
        self.player_b.is_none()
    }

    pub fn is_resolved(&self) -> bool {
        self.result_a.is_some()
    }

    pub fn involves(&self, player: &PlayerId) -> bool {
        &self.player_a == player || self.player_b.as_ref() == Some(player)
    }

    /// Players taking part, A first.
    pub fn players(&self) -> impl Iterator<Item = &PlayerId> {
        std::iter::once(&self.player_a).chain(self.player_b.as_ref())
    }

    pub fn result_for(&self, player: &PlayerId) -> Option<ResultCode> {
        if &self.player_a == player {
            self.result_a
        } else if self.player_b.as_ref() == Some(player) {
            self.result_b
        } else {
            None
        }
    }

    /// Points currently awarded to each player of this match.
    pub fn awarded(&self) -> Vec<(PlayerId, f64)> {
        let mut awarded = vec![(self.player_a.clone(), self.points_a)];
        if let Some(b) = &self.player_b {
            awarded.push((b.clone(), self.points_b));
        }
        awarded
    }

    /// Set `player`'s outcome and deduce the opponent's.
    ///
    /// A resolved match is only overwritten when `overwrite` is set. Tallies
    /// of the players are not touched here.
    pub fn set_result(
        &mut self,
        player: &PlayerId,
        outcome: Outcome,
        overwrite: bool,
    ) -> Result<(), TournamentError> {
        self.check_settable(player, overwrite)?;

        let (for_a, for_b) = if &self.player_a == player {
            (outcome, outcome.reversed())
        } else {
            (outcome.reversed(), outcome)
        };

        self.result_a = Some(for_a.code());
        self.result_b = Some(for_b.code());
        self.points_a = for_a.code().points();
        self.points_b = for_b.code().points();
        Ok(())
    }

    /// Checks performed by `set_result`, without mutating.
    pub(crate) fn check_settable(
        &self,
        player: &PlayerId,
        overwrite: bool,
    ) -> Result<(), TournamentError> {
        if self.is_bye() {
            return Err(IllegalTransition::ByeLocked.into());
        }
        if !self.involves(player) {
            return Err(InvalidReference::PlayerNotInMatch(player.clone()).into());
        }
        if self.is_resolved() && !overwrite {
            return Err(IllegalTransition::MatchAlreadyResolved.into());
        }
        Ok(())
    }

    /// Whether stored fields describe a state this type can reach.
    pub(crate) fn is_consistent(&self) -> bool {
        match (&self.player_b, self.result_a, self.result_b) {
            (None, Some(ResultCode::Bye), None) => {
                self.points_a == BYE_POINTS && self.points_b == 0.0
            }
            (Some(b), None, None) => {
                b != &self.player_a && self.points_a == 0.0 && self.points_b == 0.0
            }
            (Some(b), Some(ra), Some(rb)) => {
                let complementary = matches!(
                    (ra, rb),
                    (ResultCode::Win, ResultCode::Loss)
                        | (ResultCode::Loss, ResultCode::Win)
                        | (ResultCode::Draw, ResultCode::Draw)
                );
                b != &self.player_a
                    && complementary
                    && self.points_a == ra.points()
                    && self.points_b == rb.points()
            }
            _ => false,
        }
    }
}
