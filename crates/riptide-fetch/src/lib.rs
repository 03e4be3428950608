//! Download orchestration core.
//!
//! [`DownloadManager`] multiplexes many concurrent downloads against one
//! shared transfer engine: it owns the live registry of active downloads,
//! runs one monitor task per download that reconciles engine statistics into
//! the durable store, and resumes every unfinished record at startup from
//! the store alone.

mod active;
mod config;
mod error;
mod manager;
mod monitor;

pub use active::DownloadSnapshot;
pub use config::FetchConfig;
pub use error::{FetchError, FetchResult};
pub use manager::{DownloadManager, RecoveryReport};
