//! Tournament repository on top of JSONL.

use serde_json::Value;
use tracing::info;

use super::{JsonlReader, JsonlWriter, StorageConfig, StorageError};
use crate::models::Tournament;

/// Loads and saves tournaments.
///
/// Loading goes through the typed tournament boundary: status and tallies
/// are rebuilt, and records that fail validation are skipped.
#[derive(Debug, Clone)]
pub struct TournamentStore {
    config: StorageConfig,
}

impl TournamentStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    fn reader(&self) -> JsonlReader<Tournament> {
        JsonlReader::new(self.config.tournaments_path())
    }

    fn writer(&self) -> JsonlWriter<Tournament> {
        JsonlWriter::new(self.config.tournaments_path())
    }

    /// All stored tournaments, oldest first.
    pub fn load_all(&self) -> Result<Vec<Tournament>, StorageError> {
        let mut tournaments = self.reader().read_all()?;
        tournaments.sort_by_key(|t| t.created_at());
        Ok(tournaments)
    }

    /// Look a tournament up by id or by name.
    pub fn find(&self, key: &str) -> Result<Tournament, StorageError> {
        self.reader()
            .read_where(|t| t.id().as_str() == key || t.name() == key)?
            .into_iter()
            .next()
            .ok_or_else(|| StorageError::TournamentNotFound(key.to_string()))
    }

    /// Names of every stored tournament.
    pub fn names(&self) -> Result<Vec<String>, StorageError> {
        Ok(self
            .load_all()?
            .into_iter()
            .map(|t| t.name().to_string())
            .collect())
    }

    /// Insert or replace a tournament, matched by id.
    ///
    /// Other stored lines are kept as they are, including ones that no
    /// longer load.
    pub fn save(&self, tournament: &Tournament) -> Result<(), StorageError> {
        let id = tournament.id().as_str();
        self.writer()
            .upsert(tournament, |value| value.get("id").and_then(Value::as_str) == Some(id))?;

        info!(
            tournament = %tournament.id(),
            status = %tournament.status(),
            "Saved tournament"
        );
        Ok(())
    }
}
