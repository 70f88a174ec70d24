//! JSONL event reader - sequential reader for audit and replay

use crate::error::EventError;
use crate::event::WalletEvent;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Reads back a log written by `JsonlSink`
pub struct EventReader {
    path: PathBuf,
}

impl EventReader {
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read all events in file order. A missing file reads as empty.
    pub fn read_all(&self) -> Result<Vec<WalletEvent>, EventError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut events = Vec::new();

        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event = serde_json::from_str(&line).map_err(|e| EventError::Malformed {
                file: self.path.display().to_string(),
                line: number + 1,
                reason: e.to_string(),
            })?;
            events.push(event);
        }

        Ok(events)
    }

    /// Count non-empty lines without parsing them
    pub fn count(&self) -> Result<usize, EventError> {
        if !self.path.exists() {
            return Ok(0);
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut count = 0;
        for line in reader.lines() {
            if !line?.trim().is_empty() {
                count += 1;
            }
        }
        Ok(count)
    }
}
