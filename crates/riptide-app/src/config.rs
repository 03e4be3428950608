//! Application configuration: defaults plus environment overrides.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use riptide_engine::SimProfile;
use riptide_fetch::FetchConfig;
use tracing::warn;

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root directory for application state.
    pub data_dir: PathBuf,
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Orchestrator configuration.
    pub fetch: FetchConfig,
    /// Simulated-engine profile.
    pub engine: SimProfile,
    /// Shared deadline applied to every aggregated search.
    pub search_timeout: Duration,
    /// Override for the YTS endpoint.
    pub yts_base_url: Option<String>,
    /// Override for the Pirate Bay endpoint.
    pub piratebay_base_url: Option<String>,
    /// Override for the Nyaa.si endpoint.
    pub nyaa_base_url: Option<String>,
}

impl AppConfig {
    /// Resolve the configuration from CLI overrides, environment variables,
    /// and defaults, in that order of precedence.
    #[must_use]
    pub fn resolve(data_dir: Option<PathBuf>, download_dir: Option<PathBuf>) -> Self {
        let data_dir = data_dir
            .or_else(|| env::var_os("RIPTIDE_DATA_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let download_dir = download_dir
            .or_else(|| env::var_os("RIPTIDE_DOWNLOAD_DIR").map(PathBuf::from))
            .unwrap_or_else(|| data_dir.join("downloads"));

        let mut fetch = FetchConfig {
            download_dir,
            ..FetchConfig::default()
        };
        if let Some(secs) = env_seconds("RIPTIDE_MONITOR_INTERVAL_SECS") {
            fetch.monitor_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(secs) = env_seconds("RIPTIDE_METADATA_TIMEOUT_SECS") {
            fetch.metadata_timeout = Duration::from_secs(secs.max(1));
        }

        Self {
            database_path: data_dir.join("riptide.db"),
            data_dir,
            fetch,
            engine: SimProfile::default(),
            search_timeout: env_seconds("RIPTIDE_SEARCH_TIMEOUT_SECS")
                .map_or(DEFAULT_SEARCH_TIMEOUT, Duration::from_secs),
            yts_base_url: env::var("RIPTIDE_YTS_URL").ok(),
            piratebay_base_url: env::var("RIPTIDE_PIRATEBAY_URL").ok(),
            nyaa_base_url: env::var("RIPTIDE_NYAA_URL").ok(),
        }
    }
}

fn env_seconds(key: &str) -> Option<u64> {
    let raw = env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring non-numeric duration override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_directories_take_precedence() {
        let config = AppConfig::resolve(
            Some(PathBuf::from("/var/lib/riptide")),
            Some(PathBuf::from("/media/incoming")),
        );
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/riptide"));
        assert_eq!(
            config.database_path,
            PathBuf::from("/var/lib/riptide/riptide.db")
        );
        assert_eq!(
            config.fetch.download_dir,
            PathBuf::from("/media/incoming")
        );
    }

    #[test]
    fn download_dir_defaults_under_the_data_dir() {
        let config = AppConfig::resolve(Some(PathBuf::from("/var/lib/riptide")), None);
        if env::var_os("RIPTIDE_DOWNLOAD_DIR").is_none() {
            assert_eq!(
                config.fetch.download_dir,
                PathBuf::from("/var/lib/riptide/downloads")
            );
        }
    }
}
