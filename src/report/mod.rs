//! Backup log record
//!
//! After a completed run a small JSON record is written at the destination
//! root: when the backup ran, how many entries it covered, how much data it
//! wrote, and which selections and exclusions were in effect.

use crate::error::{IoResultExt, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Record of one completed backup run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupLogRecord {
    /// Run date, e.g. "29 August 2026"
    pub date: String,
    /// Run time, e.g. "14:03:59"
    pub time: String,
    /// Entries accounted for
    pub file_count: u64,
    /// Human-readable total bytes written
    pub total_memory: String,
    /// Selections backed up
    pub included: Vec<PathBuf>,
    /// Exclusions in effect
    pub excluded: Vec<PathBuf>,

    #[serde(skip, default = "Local::now")]
    timestamp: DateTime<Local>,
}

impl BackupLogRecord {
    /// Build a record for a run that just completed
    pub fn new(
        file_count: u64,
        bytes_copied: u64,
        included: Vec<PathBuf>,
        excluded: Vec<PathBuf>,
    ) -> Self {
        let timestamp = Local::now();
        Self {
            date: timestamp.format("%d %B %Y").to_string(),
            time: timestamp.format("%H:%M:%S").to_string(),
            file_count,
            total_memory: humansize::format_size(bytes_copied, humansize::DECIMAL),
            included,
            excluded,
            timestamp,
        }
    }

    /// Deterministic file name for this record
    pub fn file_name(&self) -> String {
        format!(
            "Backup_Log_{}_{}.json",
            self.timestamp.format("%d-%B-%Y"),
            self.timestamp.format("%H-%M-%S")
        )
    }

    /// Write the record into `dir` and return the full path
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, contents).with_path(&path)?;
        Ok(path)
    }
}
