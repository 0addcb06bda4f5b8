//! Append-only transcripts of exchanges with the generation service.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;

/// Thread-safe, optional transcript file.
///
/// A transcript opened without a directory (or whose file could not be
/// created) silently discards every entry.
#[derive(Debug, Default)]
pub struct Transcript {
    file: Mutex<Option<File>>,
}

impl Transcript {
    /// A transcript that records nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Open (or create) `{dir}/{name}.log` for appending.
    pub fn open(dir: Option<&Path>, name: &str) -> Self {
        let file = dir.and_then(|dir| {
            std::fs::create_dir_all(dir)
                .map_err(|e| log::warn!("Failed to create transcript dir {}: {}", dir.display(), e))
                .ok()?;
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join(format!("{}.log", name)))
                .map_err(|e| log::warn!("Failed to open transcript in {}: {}", dir.display(), e))
                .ok()
        });
        Self {
            file: Mutex::new(file),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Write one timestamped entry, e.g. `[2026-02-04T10:15:30.123Z] PROMPT: ...`.
    pub fn record(&self, direction: &str, data: &str) {
        let mut guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(file) = guard.as_mut() {
            let _ = writeln!(file, "[{}] {}: {}", utc_timestamp(), direction, data);
            let _ = file.flush();
        }
    }
}

/// Current UTC time as ISO 8601 with milliseconds.
fn utc_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
