//! Error types for pres-types

/// Result type for pres-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing or transforming value types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unit system name not recognized
    #[error("Invalid unit system: {value}")]
    InvalidUnitSystem { value: String },

    /// Variable value type name not recognized
    #[error("Invalid variable value type: {value}")]
    InvalidVariableType { value: String },

    /// A hierarchy modification could not be replayed against a level
    #[error("Cannot replay {operation} at position {position}: level has {len} nodes")]
    ReplayOutOfBounds {
        operation: &'static str,
        position: usize,
        len: usize,
    },

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
