//! Append-only event log
//!
//! One JSON object per line (newline-delimited JSON), the sole durable store
//! and the only input to analysis. Records are never rewritten or deleted;
//! each append writes one complete newline-terminated line so a concurrent
//! reader observes only whole records.

use crate::error::{HubwatchError, Result};
use crate::event::EventRecord;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Handle to the persisted NDJSON event log
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    /// Open the log at the given path, creating parent directories as needed
    ///
    /// The file itself is created lazily on first append; a missing file is
    /// an empty history, not an error.
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| HubwatchError::Io {
                    source: e,
                    context: format!("Failed to create log directory: {}", parent.display()),
                })?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full persisted history in arrival order
    ///
    /// Unparseable lines are skipped with a warning so a damaged line never
    /// blocks replay of the rest of the log.
    pub fn load(&self) -> Result<Vec<EventRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.path).map_err(|e| HubwatchError::Io {
            source: e,
            context: format!("Failed to open event log: {}", self.path.display()),
        })?;

        let mut records = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| HubwatchError::Io {
                source: e,
                context: format!("Failed to read event log: {}", self.path.display()),
            })?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<EventRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(
                        "Skipping malformed record at {}:{}: {}",
                        self.path.display(),
                        line_num + 1,
                        e
                    );
                }
            }
        }
        Ok(records)
    }

    /// Append one record as a complete newline-terminated JSON line
    ///
    /// A write failure is surfaced to the caller; the durability guarantee
    /// cannot be honored silently.
    pub fn append(&self, record: &EventRecord) -> Result<()> {
        let mut json = serde_json::to_string(record).map_err(|e| HubwatchError::Json {
            source: e,
            context: "Failed to serialize event record".to_string(),
        })?;
        json.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| HubwatchError::Io {
                source: e,
                context: format!("Failed to open event log for append: {}", self.path.display()),
            })?;

        file.write_all(json.as_bytes())
            .map_err(|e| HubwatchError::Io {
                source: e,
                context: format!("Failed to append to event log: {}", self.path.display()),
            })?;
        file.flush().map_err(|e| HubwatchError::Io {
            source: e,
            context: format!("Failed to flush event log: {}", self.path.display()),
        })?;

        Ok(())
    }
}
