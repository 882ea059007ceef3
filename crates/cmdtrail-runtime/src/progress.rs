//! Progress rendering for `cmdtrail track`: a single stderr line rewritten
//! in place, showing the three lifecycle steps.

use std::io::Write;

use cmdtrail_core::phase::TrackerPhase;
use cmdtrail_core::types::LifecycleSnapshot;

/// Build the step summary line for the current snapshot and phase.
pub(crate) fn status_line(
    snapshot: &LifecycleSnapshot,
    phase: TrackerPhase,
    elapsed_secs: u64,
) -> String {
    let steps = [
        ("acknowledged", snapshot.acknowledged),
        ("started", snapshot.started),
        ("output file", phase == TrackerPhase::ArtifactFound),
    ];
    let summary: Vec<String> = steps
        .iter()
        .map(|(label, done)| format!("{label} {}", if *done { "ok" } else { ".." }))
        .collect();
    format!(
        "Waiting... {} ({})",
        summary.join(", "),
        format_elapsed(elapsed_secs)
    )
}

fn format_elapsed(elapsed_secs: u64) -> String {
    if elapsed_secs >= 60 {
        format!("{}m{:02}s", elapsed_secs / 60, elapsed_secs % 60)
    } else {
        format!("{elapsed_secs}s")
    }
}

/// Rewrite the progress line in place on stderr.
pub(crate) fn draw(snapshot: &LifecycleSnapshot, phase: TrackerPhase, elapsed_secs: u64) {
    eprint!("\r{}", status_line(snapshot, phase, elapsed_secs));
    let _ = std::io::stderr().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_pending_line() {
        let line = status_line(
            &LifecycleSnapshot::default(),
            TrackerPhase::AwaitingAckAndStart,
            3,
        );
        assert_eq!(
            line,
            "Waiting... acknowledged .., started .., output file .. (3s)"
        );
    }

    #[test]
    fn acked_and_started_marked_ok() {
        let snapshot = LifecycleSnapshot {
            acknowledged: true,
            started: true,
            ..LifecycleSnapshot::default()
        };
        let line = status_line(&snapshot, TrackerPhase::LocatingArtifact, 12);
        assert_eq!(
            line,
            "Waiting... acknowledged ok, started ok, output file .. (12s)"
        );
    }

    #[test]
    fn artifact_found_marks_last_step() {
        let snapshot = LifecycleSnapshot {
            acknowledged: true,
            started: true,
            ..LifecycleSnapshot::default()
        };
        let line = status_line(&snapshot, TrackerPhase::ArtifactFound, 61);
        assert!(line.contains("output file ok"), "line: {line}");
        assert!(line.ends_with("(1m01s)"), "line: {line}");
    }

    #[test]
    fn elapsed_formatting() {
        assert_eq!(format_elapsed(0), "0s");
        assert_eq!(format_elapsed(59), "59s");
        assert_eq!(format_elapsed(60), "1m00s");
        assert_eq!(format_elapsed(125), "2m05s");
    }
}
