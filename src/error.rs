//! Error types for the cache storage
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Storage Error Enum ==
/// Unified error type for the cache storage.
///
/// Absence is never an error: lookups return `Option` instead.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Response body could not be copied into memory
    #[error("Response is not cacheable: {0}")]
    NotCacheable(String),

    /// Store was used after `shutdown()`
    #[error("Cache storage has been shut down")]
    ShutDown,

    /// Maintenance runtime could not be started
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl StorageError {
    /// Builds a `NotCacheable` error from an I/O failure while reading a body.
    pub fn unreadable(err: std::io::Error) -> Self {
        StorageError::NotCacheable(format!("unable to read response body: {}", err))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache storage.
pub type Result<T> = std::result::Result<T, StorageError>;
