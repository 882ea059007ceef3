//! cmdtrail-source-file: file-backed collaborators for the tracker.
//! The command history is a JSON file re-read on every refresh; directory
//! listings come from the task's directory under a configured root.

pub mod error;
pub mod history;
pub mod listing;

pub use cmdtrail_core::types;
