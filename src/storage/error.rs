use thiserror::Error;

/// Errors raised while talking to Cloud Storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The string is not a `gs://bucket/object` URI.
    #[error("invalid storage URI: {0}")]
    InvalidUri(String),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("storage API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("unexpected response from storage: {0}")]
    UnexpectedResponse(String),

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}
