//! Orchestrator tuning knobs.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the download orchestrator.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Root directory download payloads land in.
    pub download_dir: PathBuf,
    /// How often each monitor task samples engine statistics.
    pub monitor_interval: Duration,
    /// Bounded metadata wait applied on a manual start.
    pub metadata_timeout: Duration,
    /// Bounded metadata wait applied per record during recovery. Failures
    /// are not retried automatically; the record stays for a manual start.
    pub recover_metadata_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloads"),
            monitor_interval: Duration::from_secs(2),
            metadata_timeout: Duration::from_secs(60),
            recover_metadata_timeout: Duration::from_secs(30),
        }
    }
}
