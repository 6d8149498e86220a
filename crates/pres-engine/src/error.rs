//! Error types for the engine boundary

use thiserror::Error;

/// Result type alias for engine calls
pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures reported by a native engine handle
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine rejected or failed the call
    #[error("engine failure: {message}")]
    Failed { message: String },

    /// The call was made after the handle was released
    #[error("engine handle has been released")]
    Released,

    /// Payload could not be interpreted
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Create a failure with an engine-supplied message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}
