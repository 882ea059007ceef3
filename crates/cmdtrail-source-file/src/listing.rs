//! Directory-listing source backed by the task's directory on disk.
//!
//! The listing for task `t` is the file names under `<root>/<t>`. A missing
//! task directory is the expected state until the execution materializes
//! its sandbox; the cache entry stays absent until a fetch succeeds.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use cmdtrail_core::source::DirectoryListingSource;
use cmdtrail_core::types::{DirectoryListing, FileEntry};

/// Read a directory into a listing. `Ok(None)` means the directory does
/// not exist yet.
fn read_listing(dir: &Path) -> io::Result<Option<DirectoryListing>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        files.push(FileEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
        });
    }
    // read_dir order is platform-dependent; keep the listing deterministic.
    files.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Some(DirectoryListing { files }))
}

/// Polling source of per-task directory listings.
#[derive(Debug)]
pub struct TaskDirListingSource {
    root: PathBuf,
    cache: HashMap<String, DirectoryListing>,
}

impl TaskDirListingSource {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            cache: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DirectoryListingSource for TaskDirListingSource {
    fn refresh_directory_listing(&mut self, task_id: &str) {
        let dir = self.root.join(task_id);
        match read_listing(&dir) {
            Ok(Some(listing)) => {
                self.cache.insert(task_id.to_string(), listing);
            }
            Ok(None) => {
                debug!(dir = %dir.display(), "task directory not present yet");
            }
            Err(e) => {
                warn!(
                    dir = %dir.display(),
                    error = %e,
                    "listing refresh failed; keeping previous listing"
                );
            }
        }
    }

    fn listing(&self, task_id: &str) -> Option<&DirectoryListing> {
        self.cache.get(task_id)
    }
}

// ─── Tests ────────────────────────────────────────────────────────
