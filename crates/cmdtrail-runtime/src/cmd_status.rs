//! `cmdtrail status` — derive the lifecycle snapshot once and print JSON.

use anyhow::Context;
use chrono::{DateTime, Utc};

use cmdtrail_core::lifecycle;
use cmdtrail_source_file::history::load_history;

use crate::cli::StatusOpts;

pub fn cmd_status(opts: &StatusOpts) -> anyhow::Result<()> {
    let history = load_history(&opts.history)
        .with_context(|| format!("reading history {}", opts.history.display()))?;
    let submitted_at = DateTime::<Utc>::from_timestamp_millis(opts.timestamp)
        .context("submission timestamp out of range")?;

    let snapshot = lifecycle::derive(submitted_at, &history);
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}
