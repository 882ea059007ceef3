//! CLI definition using clap derive.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cmdtrail", about = "track a remote shell command to its output file")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Poll the command's status, then its task directory, until the output
    /// file exists; print the resolved tail path
    Track(TrackOpts),
    /// Derive the command's lifecycle snapshot once and print it as JSON
    Status(StatusOpts),
}

#[derive(clap::Args)]
pub struct TrackOpts {
    /// Command-history JSON file (re-read every poll)
    #[arg(long)]
    pub history: PathBuf,

    /// Root directory containing per-task storage directories
    #[arg(long)]
    pub task_root: PathBuf,

    /// Submission timestamp (epoch milliseconds) identifying the command
    #[arg(long)]
    pub timestamp: i64,

    /// Poll interval in milliseconds
    #[arg(long, default_value = "1000")]
    pub poll_interval_ms: u64,

    /// Suppress progress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(clap::Args)]
pub struct StatusOpts {
    /// Command-history JSON file
    #[arg(long)]
    pub history: PathBuf,

    /// Submission timestamp (epoch milliseconds) identifying the command
    #[arg(long)]
    pub timestamp: i64,
}
