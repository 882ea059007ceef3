//! Async driver for the phase machine.
//!
//! Owns the two poll timers. The status poll and the file poll run as
//! spawned tasks on a fixed cadence (first tick immediate) and feed
//! `TrackerInput`s over a channel; the controller loop steps the machine,
//! applies its effects, and tears both timers down on every exit path.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};

use cmdtrail_core::lifecycle;
use cmdtrail_core::locate::{ArtifactLocator, LocatorTick};
use cmdtrail_core::phase::{Effect, PhaseMachine, TrackerInput};
use cmdtrail_core::source::{CommandStatusSource, DirectoryListingSource, NavigationSink};
use cmdtrail_core::types::FailureKind;

use crate::progress;

// ─── Poll Handle ────────────────────────────────────────────────────

/// Owned handle to one repeating poll timer.
///
/// Cancelling an idle or already-cancelled handle is a no-op, so teardown
/// can cancel both handles unconditionally. Dropping an active handle also
/// cancels it — no poll task outlives its controller.
#[derive(Debug, Default)]
pub struct PollHandle {
    handle: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn idle() -> Self {
        Self { handle: None }
    }

    /// Install a freshly spawned poll task, cancelling any previous one.
    pub fn replace(&mut self, handle: JoinHandle<()>) {
        self.cancel();
        self.handle = Some(handle);
    }

    /// Stop the poll task. Safe to call repeatedly and on idle handles.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether a poll task is currently installed (for testing).
    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ─── Outcome ────────────────────────────────────────────────────────

/// How the tracking run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerOutcome {
    /// The output file exists; `path` is the resolved tail path.
    ArtifactFound { path: String },
    /// The command reported FAILED or INVALID.
    CommandFailed {
        kind: FailureKind,
        message: Option<String>,
    },
    /// Torn down before reaching a terminal state (Ctrl-C).
    Interrupted,
}

// ─── Poll loops ─────────────────────────────────────────────────────

async fn status_poll_loop<S>(
    source: Arc<Mutex<S>>,
    submitted_at: DateTime<Utc>,
    poll_ms: u64,
    tx: mpsc::Sender<TrackerInput>,
) where
    S: CommandStatusSource + Send + 'static,
{
    let mut ticker = interval(Duration::from_millis(poll_ms));
    loop {
        // First tick fires immediately: the initial status check is not
        // delayed by a full cadence period.
        ticker.tick().await;

        let snapshot = {
            let mut src = source.lock().await;
            src.refresh_command_status();
            lifecycle::derive(submitted_at, src.history())
        };

        if tx.send(TrackerInput::Snapshot(snapshot)).await.is_err() {
            break;
        }
    }
}

async fn file_poll_loop<D>(
    source: Arc<Mutex<D>>,
    locator: ArtifactLocator,
    poll_ms: u64,
    tx: mpsc::Sender<TrackerInput>,
) where
    D: DirectoryListingSource + Send + 'static,
{
    let mut ticker = interval(Duration::from_millis(poll_ms));
    loop {
        ticker.tick().await;

        // Check the cached listing first; only when the artifact is absent
        // request a fetch, which lands in the cache for the next tick.
        let decision = {
            let mut src = source.lock().await;
            let decision = locator.evaluate(src.listing(locator.task_id()));
            if decision == LocatorTick::AwaitRefresh {
                src.refresh_directory_listing(locator.task_id());
            }
            decision
        };

        if let LocatorTick::Found { path } = decision {
            let _ = tx.send(TrackerInput::ArtifactLocated { path }).await;
            break;
        }
    }
}

// ─── Controller ─────────────────────────────────────────────────────

/// Run the tracker for one submitted command until a terminal state or
/// Ctrl-C.
pub async fn run_tracker<S, D, N>(
    status_source: Arc<Mutex<S>>,
    listing_source: Arc<Mutex<D>>,
    nav: &mut N,
    submitted_at: DateTime<Utc>,
    poll_interval_ms: u64,
    show_progress: bool,
) -> TrackerOutcome
where
    S: CommandStatusSource + Send + 'static,
    D: DirectoryListingSource + Send + 'static,
    N: NavigationSink,
{
    let (tx, mut rx) = mpsc::channel::<TrackerInput>(16);
    let mut machine = PhaseMachine::new();
    let started = Instant::now();

    let mut status_poll = PollHandle::idle();
    let mut file_poll = PollHandle::idle();

    status_poll.replace(tokio::spawn(status_poll_loop(
        Arc::clone(&status_source),
        submitted_at,
        poll_interval_ms,
        tx.clone(),
    )));

    let outcome = loop {
        let input = tokio::select! {
            input = rx.recv() => match input {
                Some(input) => input,
                // Unreachable while this loop holds `tx`; treated as teardown.
                None => break TrackerOutcome::Interrupted,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("interrupted; tearing down pollers");
                break TrackerOutcome::Interrupted;
            }
        };

        let effects = machine.step(input);
        let mut terminal = None;

        for effect in effects {
            match effect {
                Effect::CancelStatusPoll => status_poll.cancel(),
                Effect::StartFilePoll {
                    task_id,
                    output_filename,
                } => {
                    tracing::debug!(task_id, output_filename, "switching to file poll");
                    let locator = ArtifactLocator::new(task_id, output_filename);
                    file_poll.replace(tokio::spawn(file_poll_loop(
                        Arc::clone(&listing_source),
                        locator,
                        poll_interval_ms,
                        tx.clone(),
                    )));
                }
                Effect::CancelFilePoll => file_poll.cancel(),
                Effect::NavigateTo { path } => {
                    nav.navigate_to(&path);
                    terminal = Some(TrackerOutcome::ArtifactFound { path });
                }
                Effect::ReportFailure { kind, message } => {
                    terminal = Some(TrackerOutcome::CommandFailed { kind, message });
                }
            }
        }

        if show_progress {
            progress::draw(machine.snapshot(), machine.phase(), started.elapsed().as_secs());
        }

        if let Some(outcome) = terminal {
            break outcome;
        }
    };

    // Teardown: release both timers regardless of which one is live.
    status_poll.cancel();
    file_poll.cancel();

    outcome
}

// ─── Tests ──────────────────────────────────────────────────────────
