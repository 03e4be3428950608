//! Error types for search providers.

use thiserror::Error;

/// Failure produced by one provider's search attempt.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The HTTP request failed outright.
    #[error("http request failed")]
    Http(#[from] reqwest::Error),
    /// The backend answered with a non-success status.
    #[error("provider returned status {status}")]
    Status {
        /// The HTTP status code received.
        status: reqwest::StatusCode,
    },
    /// The provider did not answer before the shared deadline.
    #[error("search timed out")]
    Timeout,
    /// The provider task failed to run to completion.
    #[error("provider task failed: {reason}")]
    Task {
        /// Join failure description.
        reason: String,
    },
}
