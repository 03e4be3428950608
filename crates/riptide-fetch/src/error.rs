//! Error types for download orchestration.

use riptide_core::EngineError;
use riptide_data::DataError;
use thiserror::Error;

/// Primary error type for orchestrator operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The magnet URI already maps to an active download.
    #[error("download already active")]
    AlreadyActive {
        /// The duplicated source locator.
        magnet: String,
    },
    /// No active download matches the given source locator or hash.
    #[error("download not found")]
    NotFound,
    /// The engine did not resolve torrent metadata within the bounded wait.
    /// Recoverable: retried on the next manual start or recovery pass.
    #[error("timed out waiting for torrent metadata")]
    MetadataTimeout,
    /// The transfer engine rejected an operation; the download is not
    /// registered.
    #[error("transfer engine failure")]
    Engine(#[source] EngineError),
    /// A store operation failed.
    #[error("persistence failure")]
    Persistence(#[from] DataError),
}

impl From<EngineError> for FetchError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::MetadataTimeout { .. } => Self::MetadataTimeout,
            other => Self::Engine(other),
        }
    }
}

/// Convenience alias for orchestrator results.
pub type FetchResult<T> = Result<T, FetchError>;
