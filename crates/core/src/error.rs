//! Unified error types for vitis.
//!
//! Every variant belongs to one of three classes that decide how a failed
//! page request is reported: upstream (502), store (500) or caller input (400).

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the vitis pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., page = 0).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Upstream step of a page request failed.
    #[error("UPSTREAM_ERROR: {operation} failed for {key}: {source}")]
    Upstream { operation: &'static str, key: String, source: Box<Error> },

    /// Persistence step of a page request failed.
    #[error("STORE_ERROR: {operation} failed for {key}: {source}")]
    Store { operation: &'static str, key: String, source: Box<Error> },

    /// Writing a computed page to the cache failed.
    #[error("CACHE_WRITE_ERROR: {key}: {source}")]
    CacheWrite { key: String, source: Box<Error> },

    /// Some upserts in an unordered batch failed.
    #[error("STORE_ERROR: {failed} of {attempted} upserts failed: {first_error}")]
    BatchWrite { attempted: usize, failed: usize, first_error: String },

    /// Store operation exceeded its deadline.
    #[error("STORE_TIMEOUT: {0}")]
    StoreTimeout(String),

    /// Database operation failed.
    #[error("STORE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Connection-level failure with no more specific variant.
    #[error("STORE_ERROR: connection: {0}")]
    Connection(String),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A page could not be encoded or decoded.
    #[error("SERIALIZATION_ERROR: {0}")]
    Serialization(String),

    /// Source document did not contain the expected data.
    #[error("EXTRACT_FAILED: {0}")]
    ExtractFailed(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// HTTP error response or transport failure.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),
}

impl Error {
    /// HTTP status class used when this error reaches a client.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidInput(_) => 400,
            Error::Upstream { .. }
            | Error::ExtractFailed(_)
            | Error::InvalidUrl(_)
            | Error::FetchTimeout(_)
            | Error::FetchTooLarge(_)
            | Error::HttpError(_) => 502,
            Error::CacheWrite { source, .. } => source.status_code(),
            Error::Store { .. }
            | Error::BatchWrite { .. }
            | Error::StoreTimeout(_)
            | Error::Database(_)
            | Error::Connection(_)
            | Error::MigrationFailed(_)
            | Error::Serialization(_) => 500,
        }
    }

    /// Whether the error came from the external data source.
    pub fn is_upstream(&self) -> bool {
        self.status_code() == 502
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            other => Error::Connection(other.to_string()),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let status = err.status_code();
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::CacheWrite { .. } => -32022,
            _ if status == 502 => -32020,
            _ => -32021,
        };
        let message = match status {
            502 => format!("upstream unavailable: {err}"),
            500 => format!("persistence failed: {err}"),
            _ => err.to_string(),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: Some(serde_json::json!({ "status": status })) }
    }
}
