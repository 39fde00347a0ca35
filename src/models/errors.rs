//! Errors raised by tournament operations.
//!
//! All of them are detected locally before any state is touched, so a failed
//! call leaves the tournament exactly as it was.

use thiserror::Error;

use super::PlayerId;

/// Any failure of a tournament operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TournamentError {
    #[error("Precondition violated: {0}")]
    Precondition(#[from] PreconditionViolation),

    #[error("Invalid reference: {0}")]
    InvalidReference(#[from] InvalidReference),

    #[error("Illegal transition: {0}")]
    IllegalTransition(#[from] IllegalTransition),

    #[error("Invalid stored tournament: {0}")]
    InvalidRecord(String),
}

/// A rule that must hold before the operation can run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreconditionViolation {
    #[error("roster has {size} players, at least {min} are required to launch")]
    RosterTooSmall { size: usize, min: usize },

    #[error("planned round count must be at least 1, got {0}")]
    InvalidRoundCount(u32),

    #[error("player {0} is already on the roster")]
    DuplicatePlayer(PlayerId),

    #[error("tournament has not been launched")]
    NotLaunched,

    #[error("round {round} still has {pending} match(es) without a result")]
    RoundIncomplete { round: u32, pending: usize },

    #[error("all {planned} planned rounds have been played")]
    RoundLimitReached { planned: u32 },
}

/// A reference to something that does not exist where it was looked for.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidReference {
    #[error("no round is currently open")]
    NoActiveRound,

    #[error("round {round} is not the active round (active: {active})")]
    RoundNotActive { round: u32, active: u32 },

    #[error("round {round} has no match at index {index}")]
    UnknownMatch { round: u32, index: usize },

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("player {0} does not play in this match")]
    PlayerNotInMatch(PlayerId),
}

/// A mutation of state that is locked.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IllegalTransition {
    #[error("tournament has already been launched")]
    AlreadyLaunched,

    #[error("roster is frozen once the tournament is launched")]
    RosterFrozen,

    #[error("tournament is finished")]
    TournamentFinished,

    #[error("round {0} has been confirmed")]
    RoundConfirmed(u32),

    #[error("a bye cannot be edited")]
    ByeLocked,

    #[error("match already has a result")]
    MatchAlreadyResolved,
}
