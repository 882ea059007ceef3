use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Update Type ──────────────────────────────────────────────────

/// Lifecycle event type reported for a submitted command.
///
/// The wire encoding is the upstream SCREAMING_SNAKE_CASE string; anything
/// this crate does not know about deserializes as `Unknown` and is ignored
/// by the lifecycle scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum UpdateType {
    Acked,
    Started,
    Failed,
    Invalid,
    #[serde(other)]
    Unknown,
}

impl UpdateType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Acked => "ACKED",
            Self::Started => "STARTED",
            Self::Failed => "FAILED",
            Self::Invalid => "INVALID",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// True for the update types that terminate the command's lifecycle.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failed | Self::Invalid)
    }
}

impl fmt::Display for UpdateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Failure Kind ─────────────────────────────────────────────────

/// Which failure update terminated the command.
///
/// FAILED and INVALID are handled identically by the phase machine; the
/// distinct tag is carried through for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Failed,
    Invalid,
}

impl FailureKind {
    /// Map a failure-class update type to its kind.
    pub fn from_update_type(update_type: UpdateType) -> Option<Self> {
        match update_type {
            UpdateType::Failed => Some(Self::Failed),
            UpdateType::Invalid => Some(Self::Invalid),
            _ => None,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed => f.write_str("failed"),
            Self::Invalid => f.write_str("invalid"),
        }
    }
}

// ─── Command Submission & Updates ─────────────────────────────────

/// Identity of one submitted shell command: the request timestamp is the
/// correlation key used to find the command's entry in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellRequest {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// One lifecycle event for a submitted command, appended by the external
/// status source over time. Never mutated here, only read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellUpdate {
    pub update_type: UpdateType,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Human-readable detail, present on some failure updates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Name of the output artifact to await; present on ACKED updates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_filename: Option<String>,
    /// Identifies the execution's storage location.
    pub task_id: String,
}

/// History of one tracked command: its submission plus all updates seen so
/// far, in arrival order. Update types are not assumed monotonic — FAILED
/// may appear without ACKED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandHistoryEntry {
    pub shell_request: ShellRequest,
    #[serde(default)]
    pub shell_updates: Vec<ShellUpdate>,
}

/// The full known universe of tracked commands, supplied fresh on every
/// poll (a snapshot, never a delta).
pub type CommandHistory = Vec<CommandHistoryEntry>;

// ─── Derived Lifecycle Snapshot ───────────────────────────────────

/// Derived status of one command, recomputed from scratch on every poll.
///
/// `started` is only actionable once `acknowledged` is also true: the
/// output filename and task identity needed to switch to the file poll are
/// only available once an ACKED update has arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleSnapshot {
    pub acknowledged: bool,
    pub started: bool,
    pub failed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl LifecycleSnapshot {
    /// Both the ACKED and STARTED updates have been observed.
    pub fn ready_for_artifact(&self) -> bool {
        self.acknowledged && self.started
    }
}

// ─── Directory Listing ────────────────────────────────────────────

/// One entry in a task's storage directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
}

/// Directory listing for a task's storage location, re-fetched each poll
/// cycle while locating the artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryListing {
    pub files: Vec<FileEntry>,
}

impl DirectoryListing {
    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|f| f.name == name)
    }
}

// ─── Tests ────────────────────────────────────────────────────────
