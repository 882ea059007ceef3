//! `cmdtrail track` — poll the command's status, then its task directory,
//! until the output file exists or the command fails.

use std::io::IsTerminal;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use cmdtrail_core::source::NavigationSink;
use cmdtrail_source_file::error::SourceFileError;
use cmdtrail_source_file::history::{HistoryFileSource, load_history};
use cmdtrail_source_file::listing::TaskDirListingSource;

use crate::cli::TrackOpts;
use crate::tracker::{TrackerOutcome, run_tracker};

/// Navigation sink for the CLI: the resolved tail path goes to stdout so
/// scripts can consume it.
struct StdoutNav;

impl NavigationSink for StdoutNav {
    fn navigate_to(&mut self, path: &str) {
        println!("{path}");
    }
}

/// Entry point for `cmdtrail track`.
///
/// Returns an exit code:
/// - 0: output file found, resolved path printed
/// - 1: command failed
/// - 2: unusable history file or submission timestamp
/// - 3: interrupted (Ctrl-C)
pub async fn cmd_track(opts: &TrackOpts) -> i32 {
    let Some(submitted_at) = DateTime::<Utc>::from_timestamp_millis(opts.timestamp) else {
        eprintln!("invalid submission timestamp: {}", opts.timestamp);
        return 2;
    };

    // A history file that exists but cannot be parsed is a configuration
    // problem worth failing fast on. A missing file has simply not been
    // written yet — the poll loop picks it up when it appears.
    match load_history(&opts.history) {
        Ok(_) => {}
        Err(SourceFileError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            eprintln!("cannot read history {}: {e}", opts.history.display());
            return 2;
        }
    }

    let status_source = Arc::new(Mutex::new(HistoryFileSource::new(opts.history.clone())));
    let listing_source = Arc::new(Mutex::new(TaskDirListingSource::new(opts.task_root.clone())));
    let mut nav = StdoutNav;

    let show_progress = std::io::stderr().is_terminal() && !opts.quiet;

    let outcome = run_tracker(
        status_source,
        listing_source,
        &mut nav,
        submitted_at,
        opts.poll_interval_ms,
        show_progress,
    )
    .await;

    if show_progress {
        eprintln!();
    }

    match outcome {
        TrackerOutcome::ArtifactFound { .. } => 0,
        TrackerOutcome::CommandFailed { kind, message } => {
            let reason = message.unwrap_or_else(|| "unknown reason".to_string());
            eprintln!("Command {kind}: {reason}");
            1
        }
        TrackerOutcome::Interrupted => 3,
    }
}
