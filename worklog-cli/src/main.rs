mod cli;
mod cli_modes;
mod common;
mod render;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use cli_modes::WorkLogCli;
use render::Renderer;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use worklog_core::WorkLog;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("wlog: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let renderer = Renderer::new(cli.color.use_color());
    let work_log = WorkLog::new()?;
    tracing::debug!(data_dir = %work_log.config.data_dir.display(), command = ?cli.command, "starting");
    WorkLogCli::new(renderer, work_log).run(cli.command).await
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
