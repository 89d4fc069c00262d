//! Error types for Tally core operations.
//!
//! The taxonomy is deliberately small: a failure of the underlying store is
//! `StoreUnavailable` and is surfaced to the caller without automatic retry;
//! a malformed document or rejected field is `Validation`. A transaction
//! whose owning client is missing is *not* an error anywhere in this crate;
//! the read path silently excludes it.

use thiserror::Error;

/// Result type alias for Tally operations.
pub type Result<T> = std::result::Result<T, TallyError>;

/// Core error type for Tally operations.
#[derive(Debug, Error)]
pub enum TallyError {
    /// The underlying store cannot be opened, or a read/write failed.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Malformed input: a bad import document, or a required field left
    /// empty on an explicit save.
    #[error("validation error: {0}")]
    Validation(String),
}

impl From<rusqlite::Error> for TallyError {
    fn from(err: rusqlite::Error) -> Self {
        TallyError::StoreUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for TallyError {
    fn from(err: serde_json::Error) -> Self {
        TallyError::Validation(err.to_string())
    }
}
