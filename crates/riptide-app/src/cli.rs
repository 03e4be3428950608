//! Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Terminal media-acquisition toolkit.
#[derive(Debug, Parser)]
#[command(name = "riptide", version, about)]
pub struct Cli {
    /// Data directory (defaults to RIPTIDE_DATA_DIR, then ./data).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Download directory (defaults to RIPTIDE_DOWNLOAD_DIR, then
    /// <data-dir>/downloads).
    #[arg(long, global = true)]
    pub download_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Recover unfinished downloads and keep monitoring until interrupted.
    Run,
    /// Search every provider for a query.
    Search {
        /// Search terms.
        query: String,
    },
    /// Start a download from a magnet URI and follow it to completion.
    Add {
        /// Magnet URI to fetch.
        magnet: String,
        /// Display name; derived from the magnet when omitted.
        #[arg(long)]
        name: Option<String>,
        /// File index to fetch; repeat for several, omit for everything.
        #[arg(long = "file", value_name = "INDEX")]
        files: Vec<u32>,
    },
    /// Show tracked (unfinished) downloads.
    Status,
    /// Show completed-download history.
    History {
        /// Maximum number of entries to print.
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_accepts_repeated_file_indices() {
        let cli = Cli::try_parse_from([
            "riptide",
            "add",
            "magnet:?xt=urn:btih:c12fe1c06bde254f72ab59b87c5f0288a6b95a20",
            "--file",
            "0",
            "--file",
            "3",
            "--name",
            "demo",
        ])
        .expect("valid invocation");
        match cli.command {
            Command::Add {
                magnet,
                name,
                files,
            } => {
                assert!(magnet.starts_with("magnet:?"));
                assert_eq!(name.as_deref(), Some("demo"));
                assert_eq!(files, vec![0, 3]);
            }
            other => panic!("expected add command, got {other:?}"),
        }
    }

    #[test]
    fn history_limit_defaults_to_twenty() {
        let cli = Cli::try_parse_from(["riptide", "history"]).expect("valid invocation");
        match cli.command {
            Command::History { limit } => assert_eq!(limit, 20),
            other => panic!("expected history command, got {other:?}"),
        }
    }

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from(["riptide", "status", "--data-dir", "/tmp/riptide"])
            .expect("valid invocation");
        assert_eq!(cli.data_dir.as_deref(), Some(std::path::Path::new("/tmp/riptide")));
    }
}
