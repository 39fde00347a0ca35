//! Player references as seen by a tournament.

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// A roster entry: the registry's identity for a player plus the points the
/// player has earned in this tournament.
///
/// The tally is only ever changed by the owning tournament and is not
/// persisted; it is rebuilt from the recorded matches on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRef {
    /// Registry identifier
    pub id: PlayerId,

    /// Display name
    pub name: String,

    #[serde(skip)]
    points: f64,
}

impl PlayerRef {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            points: 0.0,
        }
    }

    /// Points earned so far in this tournament.
    pub fn points(&self) -> f64 {
        self.points
    }

    pub(crate) fn add_points(&mut self, delta: f64) {
        self.points += delta;
    }

    pub(crate) fn reset_points(&mut self) {
        self.points = 0.0;
    }
}
