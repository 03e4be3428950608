//! Error types for the engine boundary.

use std::error::Error;
use std::time::Duration;

use thiserror::Error;

/// Primary error type for transfer-engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Metadata did not resolve within the bounded wait.
    #[error("timed out waiting for torrent metadata")]
    MetadataTimeout {
        /// How long the caller waited before giving up.
        waited: Duration,
    },
    /// Metadata has not resolved yet; retry after `await_metadata`.
    #[error("torrent metadata not resolved yet")]
    MetadataPending,
    /// The engine rejected an operation.
    #[error("engine rejected {operation}")]
    OperationFailed {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The handle refers to a transfer the engine no longer tracks.
    #[error("unknown transfer")]
    UnknownTransfer,
    /// The engine worker has shut down.
    #[error("engine is closed")]
    Closed,
}

impl EngineError {
    /// Wrap an arbitrary failure as an operation rejection.
    pub fn operation(
        operation: &'static str,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self::OperationFailed {
            operation,
            source: Box::new(source),
        }
    }
}

/// Convenience alias for engine operation results.
pub type EngineResult<T> = Result<T, EngineError>;

/// Raised when a stored state string does not name a known lifecycle state.
#[derive(Debug, Error)]
#[error("invalid download state '{0}'")]
pub struct StateParseError(pub String);
