//! Write-only record of player care actions, kept per plant.
//!
//! The simulation never reads the journal back; a failed write is logged by
//! the session and play continues.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use chrono::Local;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("journal serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JournalEvent {
    Water { amount: f64 },
    Window { open: bool },
    Stage { value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Local time, `YYYY-MM-DD HH:MM`.
    pub ts: String,
    #[serde(flatten)]
    pub event: JournalEvent,
}

impl JournalEntry {
    pub fn now(event: JournalEvent) -> Self {
        Self {
            ts: Local::now().format("%Y-%m-%d %H:%M").to_string(),
            event,
        }
    }
}

pub trait ActionJournal: Send {
    fn record(&mut self, plant_id: &str, entry: JournalEntry) -> Result<(), JournalError>;
}

pub struct NullJournal;

impl ActionJournal for NullJournal {
    fn record(&mut self, _plant_id: &str, _entry: JournalEntry) -> Result<(), JournalError> {
        Ok(())
    }
}

/// Keeps entries in memory. Clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemoryJournal {
    entries: Arc<Mutex<Vec<(String, JournalEntry)>>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(String, JournalEntry)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn events(&self) -> Vec<JournalEvent> {
        self.entries()
            .into_iter()
            .map(|(_, entry)| entry.event)
            .collect()
    }
}

impl ActionJournal for MemoryJournal {
    fn record(&mut self, plant_id: &str, entry: JournalEntry) -> Result<(), JournalError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((plant_id.to_string(), entry));
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PlantLog {
    plant_id: String,
    #[serde(default)]
    history: Vec<JournalEntry>,
}

/// Appends to `<dir>/logs/<plant_id>.json`.
pub struct JsonFileJournal {
    logs_dir: PathBuf,
}

impl JsonFileJournal {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            logs_dir: dir.as_ref().join("logs"),
        }
    }

    fn log_path(&self, plant_id: &str) -> PathBuf {
        self.logs_dir.join(format!("{plant_id}.json"))
    }

    /// Entries recorded so far for `plant_id`, oldest first.
    pub fn history(&self, plant_id: &str) -> Result<Vec<JournalEntry>, JournalError> {
        let path = self.log_path(plant_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let log: PlantLog = serde_json::from_str(&fs::read_to_string(path)?)?;
        Ok(log.history)
    }
}

impl ActionJournal for JsonFileJournal {
    fn record(&mut self, plant_id: &str, entry: JournalEntry) -> Result<(), JournalError> {
        fs::create_dir_all(&self.logs_dir)?;
        let path = self.log_path(plant_id);
        let mut log = if path.exists() {
            serde_json::from_str::<PlantLog>(&fs::read_to_string(&path)?)?
        } else {
            PlantLog {
                plant_id: plant_id.to_string(),
                history: Vec::new(),
            }
        };
        log.history.push(entry);
        fs::write(&path, serde_json::to_string_pretty(&log)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_journal_appends_history() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = JsonFileJournal::new(dir.path());
        journal
            .record("fern", JournalEntry::now(JournalEvent::Water { amount: 10.0 }))
            .unwrap();
        journal
            .record("fern", JournalEntry::now(JournalEvent::Window { open: true }))
            .unwrap();

        let history = journal.history("fern").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].event, JournalEvent::Window { open: true });
        assert!(journal.history("cactus").unwrap().is_empty());

        let raw = std::fs::read_to_string(dir.path().join("logs").join("fern.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["plant_id"], "fern");
        assert_eq!(value["history"][0]["event"], "water");
        assert_eq!(value["history"][0]["amount"], 10.0);
        assert_eq!(value["history"][0]["ts"].as_str().unwrap().len(), 16);
    }

    #[test]
    fn corrupt_log_surfaces_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("logs")).unwrap();
        std::fs::write(dir.path().join("logs").join("fern.json"), "not json").unwrap();
        let mut journal = JsonFileJournal::new(dir.path());
        let result = journal.record(
            "fern",
            JournalEntry::now(JournalEvent::Stage {
                value: "level 2".into(),
            }),
        );
        assert!(matches!(result, Err(JournalError::Serialize(_))));
    }

    #[test]
    fn memory_journal_clones_share_entries() {
        let journal = MemoryJournal::new();
        let mut writer = journal.clone();
        writer
            .record("fern", JournalEntry::now(JournalEvent::Window { open: false }))
            .unwrap();
        assert_eq!(journal.events(), vec![JournalEvent::Window { open: false }]);
    }
}
