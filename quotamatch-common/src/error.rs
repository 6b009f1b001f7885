//! Common error types for QuotaMatch

use thiserror::Error;

/// Common result type for QuotaMatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the QuotaMatch crates
#[derive(Error, Debug)]
pub enum Error {
    /// Store connection/transport failure (wraps sqlx::Error)
    ///
    /// Covers every failure of the quota store or bind cache backend.
    /// An absent record is never an error — lookups return `Option`.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),

    /// Catalog shape does not match the expected matchable columns,
    /// or a stored bind snapshot cannot be decoded
    #[error("Malformed catalog row: {0}")]
    MalformedCatalogRow(String),

    /// Host-initiated cancellation
    ///
    /// Batch cancellation is normally reported as
    /// `BatchOutcome::Cancelled`, not as an error; this kind exists for
    /// hosts that need to fold cancellation into an error channel.
    #[error("Cancelled")]
    Cancelled,

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (serialization faults and other engine bugs)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for error kinds that abort a whole batch or ingestion.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Cancelled)
    }
}
