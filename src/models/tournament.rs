//! Tournament aggregate: roster, rounds, scores and lifecycle.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{
    EntityId, IllegalTransition, InvalidReference, MatchRef, Outcome, PairingHistory, PlayerId,
    PlayerRef, PreconditionViolation, Round, TournamentError, TournamentId,
};
use crate::pairing::generate_round;

/// Smallest roster that can be launched.
pub const MIN_ROSTER_SIZE: usize = 8;

/// Planned rounds when nothing else is configured.
pub const DEFAULT_ROUNDS: u32 = 4;

/// Lifecycle stage, always derived from the rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    #[default]
    NotStarted,
    InProgress,
    Finished,
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TournamentStatus::NotStarted => write!(f, "not started"),
            TournamentStatus::InProgress => write!(f, "in progress"),
            TournamentStatus::Finished => write!(f, "finished"),
        }
    }
}

/// What `advance_round` did after confirming the active round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The next round was generated and is now active
    NextRound(u32),
    /// That was the last planned round
    Finished,
}

/// A chess club tournament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TournamentRecord", into = "TournamentRecord")]
pub struct Tournament {
    id: TournamentId,
    name: String,
    location: String,
    description: String,
    planned_rounds: u32,
    roster: Vec<PlayerRef>,
    rounds: Vec<Round>,
    history: PairingHistory,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl Tournament {
    /// Create an empty tournament that will run `planned_rounds` rounds.
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        planned_rounds: u32,
    ) -> Result<Self, TournamentError> {
        if planned_rounds == 0 {
            return Err(PreconditionViolation::InvalidRoundCount(planned_rounds).into());
        }

        let name = name.into();
        let created_at = Utc::now();
        let id = EntityId::generate(&[&name, &created_at.to_rfc3339()]);

        Ok(Self {
            id,
            name,
            location: location.into().trim().to_string(),
            description: String::new(),
            planned_rounds,
            roster: Vec::new(),
            rounds: Vec::new(),
            history: PairingHistory::new(),
            created_at,
            started_at: None,
            finished_at: None,
        })
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, text: &str) -> Self {
        self.set_description(text);
        self
    }

    pub fn id(&self) -> &TournamentId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Replace the description; an empty string clears it.
    pub fn set_description(&mut self, text: &str) {
        self.description = text.trim().to_string();
    }

    pub fn planned_rounds(&self) -> u32 {
        self.planned_rounds
    }

    pub fn roster(&self) -> &[PlayerRef] {
        &self.roster
    }

    pub fn player(&self, id: &PlayerId) -> Option<&PlayerRef> {
        self.roster.iter().find(|p| &p.id == id)
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn history(&self) -> &PairingHistory {
        &self.history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Register a player. Only allowed before launch.
    pub fn add_player(&mut self, player: PlayerRef) -> Result<(), TournamentError> {
        if self.status() != TournamentStatus::NotStarted {
            return Err(IllegalTransition::RosterFrozen.into());
        }
        if self.player(&player.id).is_some() {
            return Err(PreconditionViolation::DuplicatePlayer(player.id).into());
        }
        self.roster.push(player);
        Ok(())
    }

    /// Unregister a player. Only allowed before launch.
    pub fn remove_player(&mut self, id: &PlayerId) -> Result<PlayerRef, TournamentError> {
        if self.status() != TournamentStatus::NotStarted {
            return Err(IllegalTransition::RosterFrozen.into());
        }
        let index = self
            .roster
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| InvalidReference::UnknownPlayer(id.clone()))?;
        Ok(self.roster.remove(index))
    }

    pub fn status(&self) -> TournamentStatus {
        if self.rounds.is_empty() {
            TournamentStatus::NotStarted
        } else if self.completed_rounds() == self.planned_rounds {
            TournamentStatus::Finished
        } else {
            TournamentStatus::InProgress
        }
    }

    /// Rounds confirmed so far.
    pub fn completed_rounds(&self) -> u32 {
        self.rounds.iter().filter(|r| r.is_confirmed()).count() as u32
    }

    /// Share of planned rounds confirmed, 0 to 100.
    pub fn progress_percent(&self) -> f64 {
        self.completed_rounds() as f64 / self.planned_rounds as f64 * 100.0
    }

    /// The round currently open for results.
    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.last().filter(|r| !r.is_confirmed())
    }

    pub fn is_round_complete(&self) -> bool {
        self.current_round().is_some_and(Round::is_complete)
    }

    /// Current point tally of every rostered player.
    pub fn scores(&self) -> HashMap<PlayerId, f64> {
        self.roster
            .iter()
            .map(|p| (p.id.clone(), p.points()))
            .collect()
    }

    /// Freeze the roster and generate round 1.
    pub fn launch<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<&Round, TournamentError> {
        if self.status() != TournamentStatus::NotStarted {
            return Err(IllegalTransition::AlreadyLaunched.into());
        }
        if self.roster.len() < MIN_ROSTER_SIZE {
            return Err(PreconditionViolation::RosterTooSmall {
                size: self.roster.len(),
                min: MIN_ROSTER_SIZE,
            }
            .into());
        }

        self.started_at = Some(Utc::now());
        self.open_round(1, rng);
        info!(
            tournament = %self.id,
            players = self.roster.len(),
            rounds = self.planned_rounds,
            "Tournament launched"
        );
        Ok(&self.rounds[self.rounds.len() - 1])
    }

    /// Confirm the active round, then open the next one or finish.
    pub fn advance_round<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Advance, TournamentError> {
        match self.status() {
            TournamentStatus::NotStarted => return Err(PreconditionViolation::NotLaunched.into()),
            TournamentStatus::Finished => {
                return Err(PreconditionViolation::RoundLimitReached {
                    planned: self.planned_rounds,
                }
                .into())
            }
            TournamentStatus::InProgress => {}
        }

        let round = self
            .rounds
            .last_mut()
            .filter(|r| !r.is_confirmed())
            .ok_or(InvalidReference::NoActiveRound)?;
        if !round.is_complete() {
            return Err(PreconditionViolation::RoundIncomplete {
                round: round.number,
                pending: round.pending(),
            }
            .into());
        }

        round.confirm();
        let confirmed = round.number;
        info!(
            tournament = %self.id,
            round = confirmed,
            known_pairs = self.history.pair_count(),
            "Round confirmed"
        );

        if self.completed_rounds() == self.planned_rounds {
            self.finished_at = Some(Utc::now());
            info!(tournament = %self.id, "Tournament finished");
            return Ok(Advance::Finished);
        }

        let next = confirmed + 1;
        self.open_round(next, rng);
        Ok(Advance::NextRound(next))
    }

    /// Record a result from player A's side of the referenced match.
    pub fn record_result(
        &mut self,
        match_ref: MatchRef,
        outcome: Outcome,
    ) -> Result<(), TournamentError> {
        let player = self.locate(match_ref)?.player_a().clone();
        self.record_result_for(match_ref, &player, outcome)
    }

    /// Record `player`'s result in the referenced match of the active round.
    ///
    /// Recording again before the round is confirmed corrects the result:
    /// the points previously awarded are taken back before the new ones are
    /// applied.
    pub fn record_result_for(
        &mut self,
        match_ref: MatchRef,
        player: &PlayerId,
        outcome: Outcome,
    ) -> Result<(), TournamentError> {
        self.locate(match_ref)?.check_settable(player, true)?;

        let index = self.rounds.len() - 1;
        let game = self.rounds[index]
            .match_mut(match_ref.index)
            .ok_or(InvalidReference::UnknownMatch {
                round: match_ref.round,
                index: match_ref.index,
            })?;
        let previous = if game.is_resolved() {
            game.awarded()
        } else {
            Vec::new()
        };
        game.set_result(player, outcome, true)?;
        let awarded = game.awarded();

        for (id, points) in previous {
            self.credit(&id, -points);
        }
        for (id, points) in awarded {
            self.credit(&id, points);
        }
        Ok(())
    }

    /// Resolve a match reference against the active round.
    fn locate(&self, match_ref: MatchRef) -> Result<&super::Match, TournamentError> {
        if self.status() == TournamentStatus::Finished {
            return Err(IllegalTransition::TournamentFinished.into());
        }
        let active = self.current_round().ok_or(InvalidReference::NoActiveRound)?;
        if match_ref.round != active.number {
            if match_ref.round >= 1 && match_ref.round < active.number {
                return Err(IllegalTransition::RoundConfirmed(match_ref.round).into());
            }
            return Err(InvalidReference::RoundNotActive {
                round: match_ref.round,
                active: active.number,
            }
            .into());
        }
        active.matches().get(match_ref.index).ok_or_else(|| {
            InvalidReference::UnknownMatch {
                round: match_ref.round,
                index: match_ref.index,
            }
            .into()
        })
    }

    fn open_round<R: Rng + ?Sized>(&mut self, number: u32, rng: &mut R) {
        let players: Vec<PlayerId> = self.roster.iter().map(|p| p.id.clone()).collect();
        let round = generate_round(&players, &self.scores(), &self.history, number, rng);

        self.history.record_round(&round);
        for game in round.matches().iter().filter(|m| m.is_bye()) {
            for (id, points) in game.awarded() {
                self.credit(&id, points);
            }
        }
        self.rounds.push(round);
    }

    fn credit(&mut self, id: &PlayerId, points: f64) {
        if let Some(player) = self.roster.iter_mut().find(|p| &p.id == id) {
            player.add_points(points);
        }
    }

    /// Rebuild every tally from the recorded matches.
    fn recompute_points(&mut self) {
        for player in &mut self.roster {
            player.reset_points();
        }
        let awarded: Vec<(PlayerId, f64)> = self
            .rounds
            .iter()
            .flat_map(|r| r.matches())
            .flat_map(|m| m.awarded())
            .collect();
        for (id, points) in awarded {
            self.credit(&id, points);
        }
    }
}

/// Stored form of a tournament.
///
/// Status and point tallies are written for readers of the file but are
/// rebuilt from the rounds on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentRecord {
    pub id: TournamentId,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub planned_rounds: u32,
    #[serde(default, skip_deserializing)]
    pub status: TournamentStatus,
    pub roster: Vec<PlayerRef>,
    #[serde(default)]
    pub rounds: Vec<Round>,
    #[serde(default)]
    pub pairing_history: PairingHistory,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl From<Tournament> for TournamentRecord {
    fn from(t: Tournament) -> Self {
        let status = t.status();
        Self {
            id: t.id,
            name: t.name,
            location: t.location,
            description: t.description,
            planned_rounds: t.planned_rounds,
            status,
            roster: t.roster,
            rounds: t.rounds,
            pairing_history: t.history,
            created_at: t.created_at,
            started_at: t.started_at,
            finished_at: t.finished_at,
        }
    }
}

impl TryFrom<TournamentRecord> for Tournament {
    type Error = TournamentError;

    fn try_from(record: TournamentRecord) -> Result<Self, Self::Error> {
        if record.planned_rounds == 0 {
            return Err(PreconditionViolation::InvalidRoundCount(0).into());
        }

        let mut roster_ids = HashSet::new();
        for player in &record.roster {
            if !roster_ids.insert(&player.id) {
                return Err(PreconditionViolation::DuplicatePlayer(player.id.clone()).into());
            }
        }

        if record.rounds.len() > record.planned_rounds as usize {
            return Err(TournamentError::InvalidRecord(format!(
                "{} rounds stored for {} planned",
                record.rounds.len(),
                record.planned_rounds
            )));
        }

        let last = record.rounds.len();
        for (i, round) in record.rounds.iter().enumerate() {
            if round.number as usize != i + 1 {
                return Err(TournamentError::InvalidRecord(format!(
                    "round {} stored at position {}",
                    round.number,
                    i + 1
                )));
            }
            if !round.is_confirmed() && i + 1 != last {
                return Err(TournamentError::InvalidRecord(format!(
                    "round {} is open but is not the latest round",
                    round.number
                )));
            }
            if round.is_confirmed() && !round.is_complete() {
                return Err(TournamentError::InvalidRecord(format!(
                    "round {} is confirmed with missing results",
                    round.number
                )));
            }

            let mut seen = HashSet::new();
            for game in round.matches() {
                if !game.is_consistent() {
                    return Err(TournamentError::InvalidRecord(format!(
                        "round {} holds an inconsistent match",
                        round.number
                    )));
                }
                for id in game.players() {
                    if !roster_ids.contains(id) {
                        return Err(InvalidReference::UnknownPlayer(id.clone()).into());
                    }
                    if !seen.insert(id) {
                        return Err(TournamentError::InvalidRecord(format!(
                            "player {} appears twice in round {}",
                            id, round.number
                        )));
                    }
                }
            }
        }

        let stalled = record.rounds.last().is_some_and(Round::is_confirmed)
            && record.rounds.len() < record.planned_rounds as usize;
        if stalled {
            return Err(TournamentError::InvalidRecord(format!(
                "round {} is confirmed but round {} was never opened",
                record.rounds.len(),
                record.rounds.len() + 1
            )));
        }

        let mut history = record.pairing_history;
        for round in &record.rounds {
            history.record_round(round);
        }

        let mut tournament = Self {
            id: record.id,
            name: record.name,
            location: record.location,
            description: record.description,
            planned_rounds: record.planned_rounds,
            roster: record.roster,
            rounds: record.rounds,
            history,
            created_at: record.created_at,
            started_at: record.started_at,
            finished_at: record.finished_at,
        };
        tournament.recompute_points();
        Ok(tournament)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResultCode;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn roster(n: usize) -> Vec<PlayerRef> {
        (1..=n)
            .map(|i| PlayerRef::new(format!("AB{:05}", i), format!("Player {}", i)))
            .collect()
    }

    fn tournament(players: usize, rounds: u32) -> Tournament {
        let mut t = Tournament::new("tournament_1_paris_2025-08-10", "Paris", rounds).unwrap();
        for p in roster(players) {
            t.add_player(p).unwrap();
        }
        t
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(2024)
    }

    /// Score every open match of the active round as a win for player A.
    fn play_round(t: &mut Tournament) {
        let round = t.current_round().unwrap();
        let number = round.number;
        let open: Vec<usize> = round
            .matches()
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.is_resolved())
            .map(|(i, _)| i)
            .collect();
        for index in open {
            t.record_result(MatchRef::new(number, index), Outcome::Win)
                .unwrap();
        }
    }

    fn total_points(t: &Tournament) -> f64 {
        t.roster().iter().map(PlayerRef::points).sum()
    }

    #[test]
    fn test_new_rejects_zero_rounds() {
        let err = Tournament::new("t", "Lyon", 0).unwrap_err();
        assert_eq!(err, TournamentError::from(PreconditionViolation::InvalidRoundCount(0)));
    }

    #[test]
    fn test_new_tournament_not_started() {
        let t = tournament(8, 4);
        assert_eq!(t.status(), TournamentStatus::NotStarted);
        assert_eq!(t.completed_rounds(), 0);
        assert_eq!(t.progress_percent(), 0.0);
        assert!(t.current_round().is_none());
        assert!(!t.is_round_complete());
    }

    #[test]
    fn test_description_is_trimmed() {
        let mut t = tournament(0, 4).with_description("  Summer rapid  ");
        assert_eq!(t.description(), "Summer rapid");
        t.set_description("");
        assert_eq!(t.description(), "");
    }

    #[test]
    fn test_duplicate_player_rejected() {
        let mut t = tournament(3, 4);
        let err = t
            .add_player(PlayerRef::new("AB00001", "Someone Else"))
            .unwrap_err();
        assert_eq!(
            err,
            TournamentError::from(PreconditionViolation::DuplicatePlayer(PlayerId::from("AB00001")))
        );
        assert_eq!(t.roster().len(), 3);
    }

    #[test]
    fn test_remove_player_before_launch() {
        let mut t = tournament(3, 4);
        let removed = t.remove_player(&PlayerId::from("AB00002")).unwrap();
        assert_eq!(removed.name, "Player 2");
        assert_eq!(t.roster().len(), 2);

        let err = t.remove_player(&PlayerId::from("AB00002")).unwrap_err();
        assert!(matches!(
            err,
            TournamentError::InvalidReference(InvalidReference::UnknownPlayer(_))
        ));
    }

    #[test]
    fn test_launch_requires_eight_players() {
        for size in 0..MIN_ROSTER_SIZE {
            let mut t = tournament(size, 4);
            let err = t.launch(&mut rng()).unwrap_err();
            assert_eq!(
                err,
                TournamentError::from(PreconditionViolation::RosterTooSmall {
                    size,
                    min: MIN_ROSTER_SIZE
                })
            );
            assert_eq!(t.status(), TournamentStatus::NotStarted);
            assert!(t.rounds().is_empty());
            assert!(t.started_at().is_none());
        }
    }

    #[test]
    fn test_launch_generates_first_round() {
        for size in [8, 9, 12, 15] {
            let mut t = tournament(size, 4);
            let round = t.launch(&mut rng()).unwrap();
            assert_eq!(round.number, 1);

            assert_eq!(t.status(), TournamentStatus::InProgress);
            assert!(t.started_at().is_some());
            assert_eq!(t.history().pair_count(), size / 2);
        }
    }

    #[test]
    fn test_roster_frozen_after_launch() {
        let mut t = tournament(8, 4);
        t.launch(&mut rng()).unwrap();

        let err = t.add_player(PlayerRef::new("ZZ00001", "Late")).unwrap_err();
        assert_eq!(err, TournamentError::from(IllegalTransition::RosterFrozen));
        let err = t.remove_player(&PlayerId::from("AB00001")).unwrap_err();
        assert_eq!(err, TournamentError::from(IllegalTransition::RosterFrozen));

        let err = t.launch(&mut rng()).unwrap_err();
        assert_eq!(err, TournamentError::from(IllegalTransition::AlreadyLaunched));
    }

    #[test]
    fn test_bye_point_applied_at_creation() {
        let mut t = tournament(9, 4);
        t.launch(&mut rng()).unwrap();

        let bye = t.current_round().unwrap().bye().unwrap().clone();
        assert_eq!(t.player(&bye).unwrap().points(), 1.0);
        assert!(t.history().had_bye(&bye));
        assert_eq!(total_points(&t), 1.0);
    }

    #[test]
    fn test_win_scores_both_players() {
        let mut t = tournament(8, 4);
        t.launch(&mut rng()).unwrap();

        let game = t.current_round().unwrap().matches()[0].clone();
        t.record_result(MatchRef::new(1, 0), Outcome::Win).unwrap();

        let a = t.player(game.player_a()).unwrap();
        let b = t.player(game.player_b().unwrap()).unwrap();
        assert_eq!(a.points(), 1.0);
        assert_eq!(b.points(), 0.0);

        let stored = &t.current_round().unwrap().matches()[0];
        assert_eq!(stored.result_a(), Some(ResultCode::Win));
        assert_eq!(stored.result_b(), Some(ResultCode::Loss));
    }

    #[test]
    fn test_correction_is_idempotent_on_tallies() {
        let mut once = tournament(8, 4);
        once.launch(&mut rng()).unwrap();
        let mut corrected = once.clone();

        once.record_result(MatchRef::new(1, 2), Outcome::Draw)
            .unwrap();

        for outcome in [Outcome::Win, Outcome::Loss, Outcome::Win, Outcome::Draw] {
            corrected
                .record_result(MatchRef::new(1, 2), outcome)
                .unwrap();
        }

        assert_eq!(once.scores(), corrected.scores());
        assert_eq!(total_points(&corrected), 1.0);
    }

    #[test]
    fn test_correction_from_opponent_side() {
        let mut t = tournament(8, 4);
        t.launch(&mut rng()).unwrap();
        let game = t.current_round().unwrap().matches()[1].clone();
        let b = game.player_b().unwrap().clone();

        t.record_result(MatchRef::new(1, 1), Outcome::Win).unwrap();
        t.record_result_for(MatchRef::new(1, 1), &b, Outcome::Win)
            .unwrap();

        assert_eq!(t.player(&b).unwrap().points(), 1.0);
        assert_eq!(t.player(game.player_a()).unwrap().points(), 0.0);
    }

    #[test]
    fn test_bye_cannot_be_scored() {
        let mut t = tournament(9, 4);
        t.launch(&mut rng()).unwrap();
        let index = t
            .current_round()
            .unwrap()
            .matches()
            .iter()
            .position(|m| m.is_bye())
            .unwrap();

        let before = t.scores();
        let err = t
            .record_result(MatchRef::new(1, index), Outcome::Loss)
            .unwrap_err();
        assert_eq!(err, TournamentError::from(IllegalTransition::ByeLocked));
        assert_eq!(t.scores(), before);
    }

    #[test]
    fn test_unknown_match_and_round_references() {
        let mut t = tournament(8, 4);
        let err = t.record_result(MatchRef::new(1, 0), Outcome::Win).unwrap_err();
        assert_eq!(err, TournamentError::from(InvalidReference::NoActiveRound));

        t.launch(&mut rng()).unwrap();
        let err = t.record_result(MatchRef::new(1, 4), Outcome::Win).unwrap_err();
        assert_eq!(err, TournamentError::from(InvalidReference::UnknownMatch { round: 1, index: 4 }));

        let err = t.record_result(MatchRef::new(3, 0), Outcome::Win).unwrap_err();
        assert_eq!(err, TournamentError::from(InvalidReference::RoundNotActive { round: 3, active: 1 }));

        let err = t
            .record_result_for(MatchRef::new(1, 0), &PlayerId::from("XX"), Outcome::Win)
            .unwrap_err();
        assert_eq!(
            err,
            TournamentError::from(InvalidReference::PlayerNotInMatch(PlayerId::from("XX")))
        );
        assert_eq!(total_points(&t), 0.0);
    }

    #[test]
    fn test_advance_incomplete_round_is_rejected() {
        let mut t = tournament(8, 4);
        t.launch(&mut rng()).unwrap();
        t.record_result(MatchRef::new(1, 0), Outcome::Win).unwrap();

        let err = t.advance_round(&mut rng()).unwrap_err();
        assert_eq!(
            err,
            TournamentError::from(PreconditionViolation::RoundIncomplete { round: 1, pending: 3 })
        );
        assert_eq!(t.rounds().len(), 1);
        assert!(!t.rounds()[0].is_confirmed());
    }

    #[test]
    fn test_advance_before_launch_is_rejected() {
        let mut t = tournament(8, 4);
        let err = t.advance_round(&mut rng()).unwrap_err();
        assert_eq!(err, TournamentError::from(PreconditionViolation::NotLaunched));
    }

    #[test]
    fn test_confirmed_round_is_locked() {
        let mut t = tournament(8, 4);
        let mut r = rng();
        t.launch(&mut r).unwrap();
        play_round(&mut t);

        assert!(t.is_round_complete());
        assert_eq!(t.advance_round(&mut r).unwrap(), Advance::NextRound(2));
        assert!(t.rounds()[0].is_confirmed());
        assert!(t.rounds()[0].ended_at.is_some());

        let err = t.record_result(MatchRef::new(1, 0), Outcome::Loss).unwrap_err();
        assert_eq!(err, TournamentError::from(IllegalTransition::RoundConfirmed(1)));
    }

    #[test]
    fn test_full_lifecycle() {
        let mut t = tournament(9, 4);
        let mut r = rng();
        t.launch(&mut r).unwrap();

        for number in 1..=4 {
            assert_eq!(t.status(), TournamentStatus::InProgress);
            assert_eq!(t.current_round().unwrap().number, number);
            play_round(&mut t);

            let expected = if number == 4 {
                Advance::Finished
            } else {
                Advance::NextRound(number + 1)
            };
            assert_eq!(t.advance_round(&mut r).unwrap(), expected);
            assert_eq!(t.completed_rounds(), number);
        }

        assert_eq!(t.status(), TournamentStatus::Finished);
        assert_eq!(t.progress_percent(), 100.0);
        assert!(t.finished_at().is_some());
        assert!(t.current_round().is_none());
        // 4 decisive games plus one bye per round
        assert_eq!(total_points(&t), 20.0);

        let err = t.advance_round(&mut r).unwrap_err();
        assert_eq!(err, TournamentError::from(PreconditionViolation::RoundLimitReached { planned: 4 }));
        let err = t.record_result(MatchRef::new(4, 0), Outcome::Draw).unwrap_err();
        assert_eq!(err, TournamentError::from(IllegalTransition::TournamentFinished));
    }

    #[test]
    fn test_no_player_gets_two_byes() {
        let mut t = tournament(9, 8);
        let mut r = StdRng::seed_from_u64(11);
        t.launch(&mut r).unwrap();

        let mut byes = Vec::new();
        loop {
            byes.push(t.current_round().unwrap().bye().unwrap().clone());
            play_round(&mut t);
            if t.advance_round(&mut r).unwrap() == Advance::Finished {
                break;
            }
        }
        let unique: HashSet<_> = byes.iter().collect();
        assert_eq!(byes.len(), 8);
        assert_eq!(unique.len(), 8);
    }

    #[test]
    fn test_progress_percent() {
        let mut t = tournament(8, 4);
        let mut r = rng();
        t.launch(&mut r).unwrap();
        play_round(&mut t);
        t.advance_round(&mut r).unwrap();
        assert_eq!(t.progress_percent(), 25.0);
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut t = tournament(9, 3);
        let mut r = rng();
        t.launch(&mut r).unwrap();
        play_round(&mut t);
        t.advance_round(&mut r).unwrap();
        t.record_result(MatchRef::new(2, 0), Outcome::Draw).unwrap();

        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"status\":\"in_progress\""));
        let back: Tournament = serde_json::from_str(&json).unwrap();

        assert_eq!(back.status(), t.status());
        assert_eq!(back.scores(), t.scores());
        assert_eq!(back, t);
    }

    #[test]
    fn test_stored_status_is_ignored() {
        let mut t = tournament(8, 2);
        t.launch(&mut rng()).unwrap();

        let json = serde_json::to_string(&t)
            .unwrap()
            .replace("\"status\":\"in_progress\"", "\"status\":\"finished\"");
        let back: Tournament = serde_json::from_str(&json).unwrap();
        assert_eq!(back.status(), TournamentStatus::InProgress);
    }

    #[test]
    fn test_load_rejects_unknown_player() {
        let mut t = tournament(8, 2);
        t.launch(&mut rng()).unwrap();

        let json = serde_json::to_string(&t)
            .unwrap()
            .replace("\"id\":\"AB00008\"", "\"id\":\"ZZ99999\"");
        assert!(serde_json::from_str::<Tournament>(&json).is_err());
    }

    #[test]
    fn test_load_rejects_confirmed_rounds_without_next() {
        let mut t = tournament(8, 2);
        let mut r = rng();
        t.launch(&mut r).unwrap();
        play_round(&mut t);
        t.advance_round(&mut r).unwrap();

        let mut record = TournamentRecord::from(t);
        record.rounds.pop();
        let err = Tournament::try_from(record).unwrap_err();
        assert!(matches!(err, TournamentError::InvalidRecord(_)));
    }

    #[test]
    fn test_load_accepts_finished_record() {
        let mut t = tournament(8, 1);
        let mut r = rng();
        t.launch(&mut r).unwrap();
        play_round(&mut t);
        assert_eq!(t.advance_round(&mut r).unwrap(), Advance::Finished);

        let back = Tournament::try_from(TournamentRecord::from(t.clone())).unwrap();
        assert_eq!(back.status(), TournamentStatus::Finished);
        assert_eq!(back, t);
    }

    #[test]
    fn test_load_rebuilds_history_from_rounds() {
        let mut t = tournament(8, 2);
        t.launch(&mut rng()).unwrap();

        let mut record = TournamentRecord::from(t.clone());
        record.pairing_history = PairingHistory::new();
        let back = Tournament::try_from(record).unwrap();
        assert_eq!(back.history(), t.history());
    }
}
