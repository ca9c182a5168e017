use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::debug;

use gradebook_core::{ApiClient, ClientConfig, ConfigOverrides};

use crate::pages::{exams, files, scores, students};
use crate::CliArgs;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Roster management
    #[command(subcommand)]
    Students(students::StudentsCommand),
    /// Score entry, final calculation and reports
    #[command(subcommand)]
    Scores(scores::ScoresCommand),
    /// Exams and their weights
    #[command(subcommand)]
    Tests(exams::ExamsCommand),
    /// Files attached to exams
    #[command(subcommand)]
    Files(files::FilesCommand),
}

pub async fn run(args: CliArgs) -> Result<()> {
    let overrides = ConfigOverrides {
        base_url: args.base_url,
        timeout_secs: args.timeout_secs,
    };
    let config = ClientConfig::load(args.config.as_deref(), &overrides)
        .context("Failed to load configuration")?;
    debug!("Using backend at {}", config.base_url());

    let api = ApiClient::new(&config).context("Failed to build API client")?;

    match args.command {
        Command::Students(cmd) => students::run(&api, cmd).await,
        Command::Scores(cmd) => scores::run(&api, cmd).await,
        Command::Tests(cmd) => exams::run(&api, cmd).await,
        Command::Files(cmd) => files::run(&api, cmd).await,
    }
}
