//! Unified error types for the offline shell.
//!
//! Permission denial is deliberately absent: a blocked prompt is a state the
//! UI reflects, not a failure.

use tokio_rusqlite::rusqlite;

/// Unified error types shared by the worker and page contexts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Notification, push or worker capability missing on this platform.
    #[error("PLATFORM_UNSUPPORTED: {0}")]
    PlatformUnsupported(String),

    /// Push subscription could not be created or revoked.
    #[error("SUBSCRIPTION_FAILED: {0}")]
    SubscriptionFailed(String),

    /// Precache aborted because an asset could not be fetched or stored.
    #[error("CACHE_TRANSACTION: {0}")]
    CacheTransaction(String),

    /// Network unreachable or transport failure.
    #[error("FETCH_FAILED: {0}")]
    Fetch(String),

    /// Invalid or unsupported URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Application-server key could not be decoded.
    #[error("INVALID_KEY: {0}")]
    InvalidKey(String),

    /// Key/value storage failure.
    #[error("STORAGE_ERROR: {0}")]
    Storage(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),
}

impl Error {
    /// Whether this error means the network could not be reached.
    ///
    /// Only these failures trigger a cache fallback.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Fetch(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
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
        Error::Storage(err.to_string())
    }
}
