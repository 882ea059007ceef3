//! Collaborator interfaces consumed by the poll drivers.
//!
//! A refresh is a side-effecting request with no directly observed result;
//! the refreshed value is read back through the cached accessor on a later
//! call. Implementations surface their own transport errors (log and keep
//! the previous cache) so the core only ever sees well-formed values.

use crate::types::{CommandHistoryEntry, DirectoryListing};

/// Source of the tracked command's update history.
pub trait CommandStatusSource {
    /// Request a refresh of the command status history.
    fn refresh_command_status(&mut self);

    /// Latest known command history — always a full snapshot, never a
    /// delta. Empty until the first refresh lands.
    fn history(&self) -> &[CommandHistoryEntry];
}

/// Source of directory listings for task storage locations.
pub trait DirectoryListingSource {
    /// Request a refresh of the listing for `task_id`.
    fn refresh_directory_listing(&mut self, task_id: &str);

    /// Currently cached listing for `task_id`, if any fetch has landed.
    fn listing(&self, task_id: &str) -> Option<&DirectoryListing>;
}

/// Sink for the single terminal navigation event.
pub trait NavigationSink {
    /// Fire-and-forget; invoked exactly once per tracked command, and only
    /// on success.
    fn navigate_to(&mut self, path: &str);
}
