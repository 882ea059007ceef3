//! cmdtrail: follows one remotely executed shell command from submission
//! until its output file exists, then prints the resolved tail path.

use clap::Parser;

mod cli;
mod cmd_status;
mod cmd_track;
mod progress;
mod tracker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let filter = std::env::var("CMDTRAIL_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    // Logs go to stderr; stdout is reserved for the resolved path.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        cli::Command::Track(opts) => {
            let exit_code = cmd_track::cmd_track(&opts).await;
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        cli::Command::Status(opts) => {
            cmd_status::cmd_status(&opts)?;
        }
    }

    Ok(())
}
