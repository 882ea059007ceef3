//! Command-history source backed by a JSON file.
//!
//! Every refresh re-reads and re-parses the whole file — the history is a
//! full snapshot, not a delta. A read or parse failure keeps the previous
//! cache so downstream consumers only ever see well-formed histories.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use cmdtrail_core::source::CommandStatusSource;
use cmdtrail_core::types::CommandHistoryEntry;

use crate::error::SourceFileError;

/// Load and parse a command-history file (a JSON array of history
/// entries). One-shot form used outside the polling loop.
pub fn load_history(path: &Path) -> Result<Vec<CommandHistoryEntry>, SourceFileError> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| SourceFileError::Parse {
        path: path.display().to_string(),
        detail: e.to_string(),
    })
}

/// Polling source over a command-history JSON file.
#[derive(Debug)]
pub struct HistoryFileSource {
    path: PathBuf,
    cache: Vec<CommandHistoryEntry>,
    last_refreshed: Option<DateTime<Utc>>,
}

impl HistoryFileSource {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            cache: Vec::new(),
            last_refreshed: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the last successful refresh landed, if any.
    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }
}

impl CommandStatusSource for HistoryFileSource {
    fn refresh_command_status(&mut self) {
        match load_history(&self.path) {
            Ok(history) => {
                self.cache = history;
                self.last_refreshed = Some(Utc::now());
            }
            // Not-yet-written history is the steady state early on, not a
            // fault worth warning about on every tick.
            Err(SourceFileError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "history file not present yet");
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "history refresh failed; keeping previous snapshot"
                );
            }
        }
    }

    fn history(&self) -> &[CommandHistoryEntry] {
        &self.cache
    }
}

// ─── Tests ────────────────────────────────────────────────────────
