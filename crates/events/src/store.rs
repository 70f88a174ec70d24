//! JSONL event log - append-only writer

use crate::error::EventError;
use crate::event::WalletEvent;
use crate::sink::EventSink;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Appends every event as one JSON line to a file.
///
/// The file is opened in append mode, so several runs accumulate into the
/// same log. Each line is flushed before `emit` returns.
pub struct JsonlSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonlSink {
    /// Open (or create) the log at `path`, creating parent directories
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EventError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one event and flush it
    pub fn append(&self, event: &WalletEvent) -> Result<(), EventError> {
        let json = serde_json::to_string(event)?;
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{}", json)?;
        writer.flush()?;
        Ok(())
    }
}

impl EventSink for JsonlSink {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn emit(&self, event: &WalletEvent) {
        if let Err(e) = self.append(event) {
            tracing::warn!(
                path = %self.path.display(),
                kind = ?event.kind(),
                error = %e,
                "Failed to append event to log"
            );
        }
    }
}
