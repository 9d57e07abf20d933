//! High score persistence
//!
//! The engine only sees [`HighScoreStore`]; it loads once at construction and
//! saves whenever a new record is set. Failures are reported to the caller,
//! which treats them as non-fatal.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Key under which the best score is stored
pub const HIGH_SCORE_KEY: &str = "snakeHighScore";

/// Key-value backend remembering the best score across sessions
pub trait HighScoreStore {
    /// Read the stored high score; `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<u32>>;

    fn save(&mut self, score: u32) -> Result<()>;
}

/// Stores scores as a JSON object on disk
///
/// Other keys found in the file are kept when the score is written back.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Option<Map<String, Value>>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read high score file {:?}", self.path))?;
        let entries = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse high score file {:?}", self.path))?;
        Ok(Some(entries))
    }
}

impl HighScoreStore for JsonFileStore {
    fn load(&self) -> Result<Option<u32>> {
        let Some(entries) = self.read_entries()? else {
            return Ok(None);
        };

        match entries.get(HIGH_SCORE_KEY) {
            None => Ok(None),
            Some(value) => {
                let score = value
                    .as_u64()
                    .and_then(|v| u32::try_from(v).ok())
                    .with_context(|| format!("Invalid high score value: {}", value))?;
                Ok(Some(score))
            }
        }
    }

    fn save(&mut self, score: u32) -> Result<()> {
        // An unreadable file is replaced rather than blocking the save
        let mut entries = self.read_entries().ok().flatten().unwrap_or_default();
        entries.insert(HIGH_SCORE_KEY.to_string(), Value::from(score));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }

        let json = serde_json::to_string_pretty(&Value::Object(entries))
            .context("Failed to serialize high score")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write high score to {:?}", self.path))?;

        Ok(())
    }
}

/// In-memory store, lost when the process exits
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    score: Option<u32>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(score: u32) -> Self {
        Self {
            score: Some(score),
            saves: 0,
        }
    }

    /// Number of times `save` has been called
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<Option<u32>> {
        Ok(self.score)
    }

    fn save(&mut self, score: u32) -> Result<()> {
        self.score = Some(score);
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("scores.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("scores.json");

        let mut store = JsonFileStore::new(&path);
        store.save(120).unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.load().unwrap(), Some(120));
    }

    #[test]
    fn test_other_keys_preserved() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scores.json");
        std::fs::write(&path, r#"{"theme": "dark", "snakeHighScore": 30}"#).unwrap();

        let mut store = JsonFileStore::new(&path);
        assert_eq!(store.load().unwrap(), Some(30));
        store.save(40).unwrap();

        let content: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content["theme"], "dark");
        assert_eq!(content[HIGH_SCORE_KEY], 40);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scores.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.load().is_err());
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save(10).unwrap();
        assert_eq!(store.load().unwrap(), Some(10));
        assert_eq!(store.saves(), 1);
    }
}
