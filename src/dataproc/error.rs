//! Error types for the Dataproc REST client.
//!
//! [`DataprocError::is_transient`] is what the waiter uses to decide whether a
//! failed status poll is retried on the next interval or aborts the wait.

use thiserror::Error;

/// Errors returned by [`DataprocClient`](super::DataprocClient) and by any other
/// [`JobStatusSource`](crate::waiter::JobStatusSource).
#[derive(Debug, Error)]
pub enum DataprocError {
    /// HTTP 404 for the requested job or cluster.
    #[error("not found: {0}")]
    NotFound(String),

    /// HTTP 429. `retry_after_ms` comes from the `retry-after` header when present.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Any other non-success status.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The response body did not decode into the expected record.
    #[error("unexpected response from server: {0}")]
    UnexpectedResponse(String),

    /// The configured endpoint cannot be turned into a request URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Failure below HTTP (DNS, refused connection, timeout).
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl DataprocError {
    /// Whether a retry on the next poll has a reasonable chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            DataprocError::RateLimited { .. } | DataprocError::NetworkError(_) => true,
            DataprocError::ApiError { status, .. } => *status >= 500 || *status == 408,
            DataprocError::NotFound(_)
            | DataprocError::UnexpectedResponse(_)
            | DataprocError::InvalidEndpoint(_) => false,
        }
    }
}
