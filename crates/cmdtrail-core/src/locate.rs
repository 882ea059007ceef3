//! Artifact locator: decides, from a cached directory listing, whether the
//! awaited output file exists yet.
//!
//! The fetch and the check are deliberately decoupled: each poll tick
//! evaluates whatever listing is **currently cached**, and only when the
//! artifact is absent does the driver request a fresh fetch for the next
//! tick. Detection can therefore lag one cycle behind the file appearing —
//! an accepted trade-off, not a bug.

use crate::types::DirectoryListing;

/// Resolved path to tail a task's output file.
pub fn tail_path(task_id: &str, output_filename: &str) -> String {
    format!("{task_id}/tail/{task_id}/{output_filename}")
}

/// What a locator poll tick decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorTick {
    /// The artifact exists; stop polling and navigate to `path`.
    Found { path: String },
    /// Not there yet (or no listing cached) — request a refresh and try
    /// again next tick. Never an error; absence is the steady state.
    AwaitRefresh,
}

/// Identity of the awaited artifact, captured once on entry to the
/// artifact-location phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocator {
    task_id: String,
    output_filename: String,
}

impl ArtifactLocator {
    pub fn new(task_id: String, output_filename: String) -> Self {
        Self {
            task_id,
            output_filename,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn output_filename(&self) -> &str {
        &self.output_filename
    }

    /// Evaluate the currently cached listing. Does not fetch; the caller
    /// refreshes the listing source when this returns `AwaitRefresh`.
    pub fn evaluate(&self, cached: Option<&DirectoryListing>) -> LocatorTick {
        match cached {
            Some(listing) if listing.contains(&self.output_filename) => LocatorTick::Found {
                path: tail_path(&self.task_id, &self.output_filename),
            },
            _ => LocatorTick::AwaitRefresh,
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileEntry;

    fn listing(names: &[&str]) -> DirectoryListing {
        DirectoryListing {
            files: names
                .iter()
                .map(|n| FileEntry {
                    name: (*n).to_string(),
                })
                .collect(),
        }
    }

    fn locator() -> ArtifactLocator {
        ArtifactLocator::new("task-1".into(), "cmd.out".into())
    }

    #[test]
    fn tail_path_format() {
        assert_eq!(tail_path("t1", "out.log"), "t1/tail/t1/out.log");
    }

    #[test]
    fn no_cached_listing_awaits_refresh() {
        assert_eq!(locator().evaluate(None), LocatorTick::AwaitRefresh);
    }

    #[test]
    fn artifact_absent_awaits_refresh() {
        let cached = listing(&["stdout", "stderr"]);
        assert_eq!(locator().evaluate(Some(&cached)), LocatorTick::AwaitRefresh);
    }

    #[test]
    fn empty_listing_awaits_refresh() {
        let cached = listing(&[]);
        assert_eq!(locator().evaluate(Some(&cached)), LocatorTick::AwaitRefresh);
    }

    #[test]
    fn artifact_present_resolves_tail_path() {
        let cached = listing(&["stdout", "cmd.out"]);
        assert_eq!(
            locator().evaluate(Some(&cached)),
            LocatorTick::Found {
                path: "task-1/tail/task-1/cmd.out".into()
            }
        );
    }

    #[test]
    fn exact_name_match_only() {
        let cached = listing(&["cmd.out.partial", "xcmd.out"]);
        assert_eq!(locator().evaluate(Some(&cached)), LocatorTick::AwaitRefresh);
    }

    #[test]
    fn evaluate_is_read_only() {
        // Two evaluations of the same cached listing agree — the check
        // never consumes or mutates anything.
        let cached = listing(&["cmd.out"]);
        let loc = locator();
        assert_eq!(loc.evaluate(Some(&cached)), loc.evaluate(Some(&cached)));
    }
}
