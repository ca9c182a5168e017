mod app;
mod commands;
mod components;
mod pages;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use app::Command;

#[derive(Parser, Debug)]
#[command(
    name = "gradebook",
    version,
    about = "Manage course rosters, exams and scores on the grade-management backend"
)]
pub struct CliArgs {
    /// Backend base URL (overrides the config file and GRADEBOOK_API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// Config file (defaults to <config dir>/gradebook/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    match app::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
