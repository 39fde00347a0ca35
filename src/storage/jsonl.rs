//! JSONL (JSON Lines) storage.
//!
//! Each line is one JSON document. Files are small (one line per
//! tournament), so updates rewrite the whole file, keeping every line they
//! do not replace byte for byte.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::StorageError;

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append a single entity to the file.
    pub fn append(&self, entity: &T) -> Result<(), StorageError> {
        self.ensure_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = BufWriter::new(file);
        let json = serde_json::to_string(entity)?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;

        debug!("Appended entity to {:?}", self.path);
        Ok(())
    }

    /// Replace the first line `matches` accepts with `entity`, or append it
    /// when none does. Returns whether a line was replaced.
    ///
    /// Lines are compared as raw JSON, so lines that no longer load as `T`
    /// are written back untouched.
    pub fn upsert<F>(&self, entity: &T, matches: F) -> Result<bool, StorageError>
    where
        F: Fn(&Value) -> bool,
    {
        if !self.path.exists() {
            self.append(entity)?;
            return Ok(false);
        }

        let json = serde_json::to_string(entity)?;
        let reader = BufReader::new(File::open(&self.path)?);
        let mut lines = Vec::new();
        let mut replaced = false;

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let hit = !replaced
                && serde_json::from_str::<Value>(&line)
                    .map(|value| matches(&value))
                    .unwrap_or(false);
            if hit {
                lines.push(json.clone());
                replaced = true;
            } else {
                lines.push(line);
            }
        }

        if !replaced {
            lines.push(json);
        }
        self.replace_file(&lines)?;
        Ok(replaced)
    }

    /// Write `lines` to a sibling temp file, then rename it over the target,
    /// so a failed write never truncates existing data.
    fn replace_file(&self, lines: &[String]) -> Result<(), StorageError> {
        self.ensure_dir()?;

        let tmp_path = self.path.with_extension("jsonl.tmp");
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        for line in lines {
            writeln!(writer, "{}", line)?;
        }
        writer.flush()?;
        drop(writer);

        fs::rename(&tmp_path, &self.path)?;
        info!("Wrote {} lines to {:?}", lines.len(), self.path);
        Ok(())
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Read all entities from the file. A missing file reads as empty;
    /// lines that fail to parse are skipped.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    warn!(
                        "Failed to parse line {} in {:?}: {}",
                        index + 1,
                        self.path,
                        e
                    );
                }
            }
        }

        debug!("Read {} entities from {:?}", entities.len(), self.path);
        Ok(entities)
    }

    /// Read entities matching a predicate.
    pub fn read_where<F>(&self, predicate: F) -> Result<Vec<T>, StorageError>
    where
        F: Fn(&T) -> bool,
    {
        let all = self.read_all()?;
        Ok(all.into_iter().filter(predicate).collect())
    }
}
