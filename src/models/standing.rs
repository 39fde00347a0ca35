//! Standings and per-player statistics models.

use serde::{Deserialize, Serialize};

use super::{PlayerId, PlayerRef, ResultCode};

/// Win/loss/draw record, byes counted apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WinLossRecord {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub byes: u32,
}

impl WinLossRecord {
    pub fn new(wins: u32, losses: u32, draws: u32, byes: u32) -> Self {
        Self {
            wins,
            losses,
            draws,
            byes,
        }
    }

    /// Count one result.
    pub fn add(&mut self, code: ResultCode) {
        match code {
            ResultCode::Win => self.wins += 1,
            ResultCode::Loss => self.losses += 1,
            ResultCode::Draw => self.draws += 1,
            ResultCode::Bye => self.byes += 1,
        }
    }

    /// Games with a result, byes included.
    pub fn total_games(&self) -> u32 {
        self.wins + self.losses + self.draws + self.byes
    }

    /// Win rate over games actually played (0.0 to 1.0).
    pub fn win_rate(&self) -> f64 {
        let played = self.wins + self.losses + self.draws;
        if played == 0 {
            0.0
        } else {
            self.wins as f64 / played as f64
        }
    }
}

impl std::fmt::Display for WinLossRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.wins, self.losses, self.draws)?;
        if self.byes > 0 {
            write!(f, " ({} bye)", self.byes)?;
        }
        Ok(())
    }
}

/// One line of a tournament's standings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub player: PlayerRef,

    /// Competition rank: tied players share it, the next rank skips ahead
    pub rank: u32,

    pub points: f64,

    pub record: WinLossRecord,
}

/// A player's statistics across several tournaments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerCareer {
    pub player_id: PlayerId,

    /// Most recently seen display name
    pub name: String,

    /// Tournaments the player was rostered in
    pub participations: u32,

    /// Finished tournaments the player ended at rank 1, ties included
    pub titles: u32,

    /// Matches with a result, byes included
    pub matches_played: u32,

    pub points: f64,
}

impl PlayerCareer {
    pub fn new(player_id: PlayerId, name: String) -> Self {
        Self {
            player_id,
            name,
            participations: 0,
            titles: 0,
            matches_played: 0,
            points: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts() {
        let mut record = WinLossRecord::default();
        for code in [
            ResultCode::Win,
            ResultCode::Win,
            ResultCode::Draw,
            ResultCode::Loss,
            ResultCode::Bye,
        ] {
            record.add(code);
        }
        assert_eq!(record, WinLossRecord::new(2, 1, 1, 1));
        assert_eq!(record.total_games(), 5);
        assert!((record.win_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_record_display() {
        assert_eq!(WinLossRecord::new(3, 1, 0, 0).to_string(), "3-1-0");
        assert_eq!(WinLossRecord::new(2, 1, 0, 1).to_string(), "2-1-0 (1 bye)");
    }

    #[test]
    fn test_empty_record_win_rate() {
        assert_eq!(WinLossRecord::new(0, 0, 0, 1).win_rate(), 0.0);
    }
}
