//! Error types for the search core.
//!
//! Unknown terms, unknown documents and blank queries are not errors; they
//! produce empty results. Only programmer errors detected at construction
//! time surface here.

/// Result type for search core operations
pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// An LRU cache was asked to hold zero entries
    #[error("cache capacity must be at least 1")]
    InvalidCapacity,

    /// Engine configuration failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
