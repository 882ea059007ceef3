//! Phase controller state machine.
//!
//! Explicit reformulation of the dual-phase poller: one transition function
//! taking the current phase plus an input (a freshly derived snapshot or a
//! locator event) and returning the effects the driver must apply — timer
//! cancellation/creation, navigation, failure reporting. Keeping the
//! machine pure makes edge-triggering, failure precedence, and one-shot
//! terminal emission testable without real timers.

use serde::{Deserialize, Serialize};

use crate::types::{FailureKind, LifecycleSnapshot};

// ─── Phase ────────────────────────────────────────────────────────

/// Where the tracked command is in its lifecycle.
///
/// `ArtifactFound` and `CommandFailed` are terminal: they absorb all
/// further input without effects, which is what makes the terminal
/// emission unique per tracked command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerPhase {
    #[default]
    AwaitingAckAndStart,
    LocatingArtifact,
    ArtifactFound,
    CommandFailed,
}

impl TrackerPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::ArtifactFound | Self::CommandFailed)
    }
}

// ─── Inputs & Effects ─────────────────────────────────────────────

/// One input to the transition function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerInput {
    /// A snapshot derived from the latest command history.
    Snapshot(LifecycleSnapshot),
    /// The artifact locator found the output file at `path`.
    ArtifactLocated { path: String },
}

/// Side effect the driver must apply after a transition.
///
/// The driver is the sole owner of both poll timers; the machine only ever
/// names them. Cancelling a timer that is not running must be a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CancelStatusPoll,
    StartFilePoll {
        task_id: String,
        output_filename: String,
    },
    CancelFilePoll,
    NavigateTo {
        path: String,
    },
    ReportFailure {
        kind: FailureKind,
        message: Option<String>,
    },
}

// ─── Machine ──────────────────────────────────────────────────────

/// The phase state machine for one tracked command.
///
/// Holds the last derived snapshot for display. The discovery→location
/// transition is edge-triggered by construction: it can only fire while the
/// machine is still in `AwaitingAckAndStart`, and firing leaves that state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseMachine {
    phase: TrackerPhase,
    snapshot: LifecycleSnapshot,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TrackerPhase {
        self.phase
    }

    /// Last snapshot fed into the machine (for progress display).
    pub fn snapshot(&self) -> &LifecycleSnapshot {
        &self.snapshot
    }

    /// Apply one input and return the effects to perform, in order.
    ///
    /// Terminal phases absorb everything. On a snapshot, the failure check
    /// runs before the ack∧start edge check — a history containing both a
    /// failure and a completed ack/start pair ends in `CommandFailed`.
    pub fn step(&mut self, input: TrackerInput) -> Vec<Effect> {
        if self.phase.is_terminal() {
            return Vec::new();
        }
        match input {
            TrackerInput::Snapshot(snapshot) => self.on_snapshot(snapshot),
            TrackerInput::ArtifactLocated { path } => self.on_artifact_located(path),
        }
    }

    fn on_snapshot(&mut self, snapshot: LifecycleSnapshot) -> Vec<Effect> {
        if snapshot.failed {
            let cancel = match self.phase {
                TrackerPhase::LocatingArtifact => Effect::CancelFilePoll,
                _ => Effect::CancelStatusPoll,
            };
            let kind = snapshot.failure.unwrap_or(FailureKind::Failed);
            let message = snapshot.failure_message.clone();
            self.snapshot = snapshot;
            self.phase = TrackerPhase::CommandFailed;
            return vec![cancel, Effect::ReportFailure { kind, message }];
        }

        if self.phase == TrackerPhase::AwaitingAckAndStart
            && snapshot.ready_for_artifact()
            && let (Some(task_id), Some(output_filename)) =
                (snapshot.task_id.clone(), snapshot.output_filename.clone())
        {
            // The handoff needs both the filename (from the ACKED update)
            // and the task identity (from the first update); without them
            // the status poll keeps running and a later snapshot retries.
            self.snapshot = snapshot;
            self.phase = TrackerPhase::LocatingArtifact;
            return vec![
                Effect::CancelStatusPoll,
                Effect::StartFilePoll {
                    task_id,
                    output_filename,
                },
            ];
        }

        self.snapshot = snapshot;
        Vec::new()
    }

    fn on_artifact_located(&mut self, path: String) -> Vec<Effect> {
        if self.phase != TrackerPhase::LocatingArtifact {
            // Stale locator event (e.g. a failure won the race); drop it.
            return Vec::new();
        }
        self.phase = TrackerPhase::ArtifactFound;
        vec![Effect::CancelFilePoll, Effect::NavigateTo { path }]
    }
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_snapshot() -> LifecycleSnapshot {
        LifecycleSnapshot {
            acknowledged: true,
            started: true,
            output_filename: Some("cmd.out".into()),
            task_id: Some("task-1".into()),
            ..LifecycleSnapshot::default()
        }
    }

    fn failed_snapshot(message: Option<&str>) -> LifecycleSnapshot {
        LifecycleSnapshot {
            failed: true,
            failure: Some(FailureKind::Failed),
            failure_message: message.map(str::to_string),
            ..LifecycleSnapshot::default()
        }
    }

    // ── Discovery phase ─────────────────────────────────────────────

    #[test]
    fn empty_snapshot_keeps_awaiting() {
        let mut machine = PhaseMachine::new();
        let effects = machine.step(TrackerInput::Snapshot(LifecycleSnapshot::default()));
        assert!(effects.is_empty());
        assert_eq!(machine.phase(), TrackerPhase::AwaitingAckAndStart);
    }

    #[test]
    fn acked_only_keeps_awaiting() {
        let mut machine = PhaseMachine::new();
        let snapshot = LifecycleSnapshot {
            acknowledged: true,
            output_filename: Some("cmd.out".into()),
            task_id: Some("task-1".into()),
            ..LifecycleSnapshot::default()
        };
        let effects = machine.step(TrackerInput::Snapshot(snapshot));
        assert!(effects.is_empty());
        assert_eq!(machine.phase(), TrackerPhase::AwaitingAckAndStart);
    }

    #[test]
    fn ack_and_start_edge_fires_handoff() {
        let mut machine = PhaseMachine::new();
        let effects = machine.step(TrackerInput::Snapshot(ready_snapshot()));

        assert_eq!(
            effects,
            vec![
                Effect::CancelStatusPoll,
                Effect::StartFilePoll {
                    task_id: "task-1".into(),
                    output_filename: "cmd.out".into(),
                },
            ]
        );
        assert_eq!(machine.phase(), TrackerPhase::LocatingArtifact);
    }

    #[test]
    fn edge_fires_at_most_once() {
        let mut machine = PhaseMachine::new();
        let first = machine.step(TrackerInput::Snapshot(ready_snapshot()));
        assert_eq!(first.len(), 2);

        // Subsequent level-true snapshots must not re-fire the transition.
        for _ in 0..3 {
            let effects = machine.step(TrackerInput::Snapshot(ready_snapshot()));
            assert!(effects.is_empty());
            assert_eq!(machine.phase(), TrackerPhase::LocatingArtifact);
        }
    }

    #[test]
    fn ready_without_filename_keeps_polling() {
        let mut machine = PhaseMachine::new();
        let snapshot = LifecycleSnapshot {
            acknowledged: true,
            started: true,
            task_id: Some("task-1".into()),
            ..LifecycleSnapshot::default()
        };
        let effects = machine.step(TrackerInput::Snapshot(snapshot));
        assert!(effects.is_empty());
        assert_eq!(machine.phase(), TrackerPhase::AwaitingAckAndStart);

        // A later snapshot that carries the filename completes the handoff.
        let effects = machine.step(TrackerInput::Snapshot(ready_snapshot()));
        assert_eq!(effects.len(), 2);
        assert_eq!(machine.phase(), TrackerPhase::LocatingArtifact);
    }

    // ── Failure ─────────────────────────────────────────────────────

    #[test]
    fn failure_during_discovery_cancels_status_poll() {
        let mut machine = PhaseMachine::new();
        let effects = machine.step(TrackerInput::Snapshot(failed_snapshot(Some("exit code 1"))));

        assert_eq!(
            effects,
            vec![
                Effect::CancelStatusPoll,
                Effect::ReportFailure {
                    kind: FailureKind::Failed,
                    message: Some("exit code 1".into()),
                },
            ]
        );
        assert_eq!(machine.phase(), TrackerPhase::CommandFailed);
    }

    #[test]
    fn failure_during_location_cancels_file_poll() {
        let mut machine = PhaseMachine::new();
        machine.step(TrackerInput::Snapshot(ready_snapshot()));

        let effects = machine.step(TrackerInput::Snapshot(failed_snapshot(None)));
        assert_eq!(
            effects,
            vec![
                Effect::CancelFilePoll,
                Effect::ReportFailure {
                    kind: FailureKind::Failed,
                    message: None,
                },
            ]
        );
        assert_eq!(machine.phase(), TrackerPhase::CommandFailed);
    }

    #[test]
    fn failure_wins_over_simultaneous_ack_and_start() {
        // One snapshot carrying both a failure and a completed ack/start
        // pair: the failure check runs first, so no handoff happens.
        let mut machine = PhaseMachine::new();
        let snapshot = LifecycleSnapshot {
            failed: true,
            failure: Some(FailureKind::Failed),
            ..ready_snapshot()
        };
        let effects = machine.step(TrackerInput::Snapshot(snapshot));

        assert_eq!(effects[0], Effect::CancelStatusPoll);
        assert!(matches!(effects[1], Effect::ReportFailure { .. }));
        assert_eq!(machine.phase(), TrackerPhase::CommandFailed);
    }

    #[test]
    fn invalid_kind_preserved_in_report() {
        let mut machine = PhaseMachine::new();
        let snapshot = LifecycleSnapshot {
            failed: true,
            failure: Some(FailureKind::Invalid),
            ..LifecycleSnapshot::default()
        };
        let effects = machine.step(TrackerInput::Snapshot(snapshot));
        assert_eq!(
            effects[1],
            Effect::ReportFailure {
                kind: FailureKind::Invalid,
                message: None,
            }
        );
    }

    // ── Artifact located ────────────────────────────────────────────

    #[test]
    fn located_artifact_navigates_once() {
        let mut machine = PhaseMachine::new();
        machine.step(TrackerInput::Snapshot(ready_snapshot()));

        let effects = machine.step(TrackerInput::ArtifactLocated {
            path: "task-1/tail/task-1/cmd.out".into(),
        });
        assert_eq!(
            effects,
            vec![
                Effect::CancelFilePoll,
                Effect::NavigateTo {
                    path: "task-1/tail/task-1/cmd.out".into(),
                },
            ]
        );
        assert_eq!(machine.phase(), TrackerPhase::ArtifactFound);
    }

    #[test]
    fn located_event_before_handoff_is_ignored() {
        let mut machine = PhaseMachine::new();
        let effects = machine.step(TrackerInput::ArtifactLocated {
            path: "task-1/tail/task-1/cmd.out".into(),
        });
        assert!(effects.is_empty());
        assert_eq!(machine.phase(), TrackerPhase::AwaitingAckAndStart);
    }

    #[test]
    fn located_event_after_failure_is_ignored() {
        let mut machine = PhaseMachine::new();
        machine.step(TrackerInput::Snapshot(ready_snapshot()));
        machine.step(TrackerInput::Snapshot(failed_snapshot(None)));

        let effects = machine.step(TrackerInput::ArtifactLocated {
            path: "task-1/tail/task-1/cmd.out".into(),
        });
        assert!(effects.is_empty());
        assert_eq!(machine.phase(), TrackerPhase::CommandFailed);
    }

    // ── Terminal uniqueness ─────────────────────────────────────────

    #[test]
    fn terminal_phases_absorb_all_input() {
        let mut machine = PhaseMachine::new();
        machine.step(TrackerInput::Snapshot(ready_snapshot()));
        machine.step(TrackerInput::ArtifactLocated {
            path: "task-1/tail/task-1/cmd.out".into(),
        });
        assert_eq!(machine.phase(), TrackerPhase::ArtifactFound);

        let inputs = [
            TrackerInput::Snapshot(ready_snapshot()),
            TrackerInput::Snapshot(failed_snapshot(Some("late"))),
            TrackerInput::ArtifactLocated {
                path: "task-1/tail/task-1/cmd.out".into(),
            },
        ];
        for input in inputs {
            assert!(machine.step(input).is_empty());
            assert_eq!(machine.phase(), TrackerPhase::ArtifactFound);
        }
    }

    #[test]
    fn failed_is_terminal_for_later_snapshots() {
        let mut machine = PhaseMachine::new();
        machine.step(TrackerInput::Snapshot(failed_snapshot(None)));

        let effects = machine.step(TrackerInput::Snapshot(ready_snapshot()));
        assert!(effects.is_empty());
        assert_eq!(machine.phase(), TrackerPhase::CommandFailed);
    }

    #[test]
    fn phase_serde_tags() {
        let json = serde_json::to_string(&TrackerPhase::LocatingArtifact).expect("serialize");
        assert_eq!(json, "\"locating_artifact\"");
    }
}
