//! Application wiring for the riptide CLI: configuration, logging, service
//! bootstrap, and the command implementations.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod telemetry;

mod commands;

use anyhow::Result;

use crate::cli::{Cli, Command};
use crate::config::AppConfig;

/// Run the parsed CLI command to completion.
///
/// # Errors
///
/// Returns an error when logging cannot be installed, bootstrap fails, or
/// the command itself fails.
pub async fn run(cli: Cli) -> Result<()> {
    telemetry::init_logging()?;
    let config = AppConfig::resolve(cli.data_dir, cli.download_dir);
    let app = bootstrap::bootstrap(config).await?;
    match cli.command {
        Command::Run => commands::run(&app).await,
        Command::Search { query } => commands::search(&app, &query).await,
        Command::Add {
            magnet,
            name,
            files,
        } => commands::add(&app, &magnet, name, files).await,
        Command::Status => commands::status(&app).await,
        Command::History { limit } => commands::history(&app, limit).await,
    }
}
