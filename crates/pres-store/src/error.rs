//! Error types for pres-store

/// Result type for record-store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by record-store implementations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The statement could not be prepared
    #[error("Failed to prepare statement `{sql}`: {message}")]
    Prepare { sql: String, message: String },

    /// The statement failed while stepping
    #[error("Query failed for `{sql}`: {message}")]
    Query { sql: String, message: String },

    /// The store session is closed
    #[error("Record store {key} is closed")]
    Closed { key: String },

    /// Selection scope id not offered by the provider
    #[error("Unknown selection scope: {id}")]
    UnknownSelectionScope { id: String },
}
