//! Error types for the analytics engine

use thiserror::Error;

/// Main error type for the analytics engine
#[derive(Error, Debug)]
pub enum Error {
    /// Event store error
    #[error("Event store error: {0}")]
    Store(#[from] StoreError),

    /// Metric cache error
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Date range is not well ordered
    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    /// Date range spans more days than the engine iterates
    #[error("Date range too large: {days} days exceeds maximum {max}")]
    RangeTooLarge {
        /// Days covered by the requested range
        days: i64,
        /// Configured maximum
        max: u32,
    },

    /// Event violates its construction invariants
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Event store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store backend could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Query execution failed
    #[error("Query error: {0}")]
    QueryFailed(String),

    /// Query exceeded the backend's own timeout
    #[error("Query timed out after {0} ms")]
    Timeout(u64),
}

/// Metric cache errors
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache backend could not be reached
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// Backend rejected the operation
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for event store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type for cache operations
pub type CacheResult<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_converts() {
        let err: Error = StoreError::Unavailable("connection refused".to_string()).into();
        assert!(matches!(err, Error::Store(StoreError::Unavailable(_))));
        assert_eq!(
            err.to_string(),
            "Event store error: Store unavailable: connection refused"
        );
    }

    #[test]
    fn test_range_too_large_message() {
        let err = Error::RangeTooLarge { days: 5000, max: 3660 };
        assert_eq!(
            err.to_string(),
            "Date range too large: 5000 days exceeds maximum 3660"
        );
    }
}
