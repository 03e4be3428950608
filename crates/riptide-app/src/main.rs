//! Binary entrypoint for the riptide CLI.

use clap::Parser;
use riptide_app::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    riptide_app::run(Cli::parse()).await
}
