//! Lifecycle deriver: full command history in, derived snapshot out.
//!
//! This is a **pure function**: no IO, no retained state. The status poll
//! calls it once per tick with the complete history, and the result is
//! recomputed from scratch — tolerant of duplicate or out-of-order updates
//! at the cost of a rescan per tick.

use chrono::{DateTime, Utc};

use crate::types::{CommandHistoryEntry, FailureKind, LifecycleSnapshot, UpdateType};

/// Derive the lifecycle snapshot for the command submitted at
/// `submitted_at` from the full `history`.
///
/// A missing history entry, or an entry with no updates yet, yields the
/// all-false snapshot: the updates simply have not arrived.
///
/// The three scans (failure, acked, started) are independent; each takes
/// the first occurrence of its update type. Task identity is copied from
/// the **first** update in the sequence, not the ACKED one — observed
/// upstream behavior, kept as-is (see DESIGN.md).
pub fn derive(submitted_at: DateTime<Utc>, history: &[CommandHistoryEntry]) -> LifecycleSnapshot {
    let Some(entry) = history
        .iter()
        .find(|e| e.shell_request.timestamp == submitted_at)
    else {
        return LifecycleSnapshot::default();
    };

    let updates = &entry.shell_updates;
    let mut snapshot = LifecycleSnapshot::default();

    if let Some(failure) = updates.iter().find(|u| u.update_type.is_failure()) {
        snapshot.failed = true;
        snapshot.failure = FailureKind::from_update_type(failure.update_type);
        snapshot.failure_message = failure.message.clone();
    }

    if let Some(acked) = updates
        .iter()
        .find(|u| u.update_type == UpdateType::Acked)
    {
        snapshot.acknowledged = true;
        snapshot.output_filename = acked.output_filename.clone();
        snapshot.task_id = updates.first().map(|u| u.task_id.clone());
    }

    snapshot.started = updates
        .iter()
        .any(|u| u.update_type == UpdateType::Started);

    snapshot
}

// ─── Tests ────────────────────────────────────────────────────────
