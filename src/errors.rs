//! Error hierarchy for the watch engine.
//!
//! Errors detected on a one-shot path (bridge construction or a direct decode
//! call) are returned to the caller. Errors detected inside a running watch are
//! absorbed by its background task and never reach this type's consumers.

use config::ConfigError;

use crate::ValueKind;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

/// Error type returned by validation predicates
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Stored payload does not have the requested shape
    #[error("failed to decode key {key}: expected {expected}, found {found}")]
    Decode {
        key: String,
        expected: ValueKind,
        found: String,
    },

    /// Payload decoded but the caller's predicate rejected it
    #[error("validation failed for key {key}: {source}")]
    Validation {
        key: String,
        #[source]
        source: BoxError,
    },

    /// Change subscription could not be opened
    #[error("failed to watch key {key}: {source}")]
    Subscription {
        key: String,
        #[source]
        source: StoreError,
    },

    /// Point read against the store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// The key the error refers to, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            Error::Decode { key, .. } | Error::Validation { key, .. } | Error::Subscription { key, .. } => {
                Some(key.as_str())
            }
            Error::Store(StoreError::NotFound(key)) => Some(key.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    /// The store was shut down; no further reads, writes or watches
    #[error("store is closed")]
    Closed,

    /// Payload serialization failures
    #[error(transparent)]
    Encode(#[from] bincode::Error),

    /// Failures reported by a remote backend
    #[error("Store backend error: {0}")]
    Backend(String),
}
