//! Error types for pres-core

use std::fmt;
use std::path::PathBuf;

use pres_engine::EngineError;

/// Result type for presentation manager operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad failure classes callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Engine failure, missing or undecodable payload
    Protocol,
    /// The call itself was invalid; the engine was not contacted
    Usage,
    /// Record-store query failure
    Store,
    /// Configuration could not be loaded
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Protocol => write!(f, "protocol"),
            ErrorKind::Usage => write!(f, "usage"),
            ErrorKind::Store => write!(f, "store"),
            ErrorKind::Config => write!(f, "config"),
        }
    }
}

/// Errors that can occur in presentation manager operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The engine failed a call
    #[error("Engine call {operation} failed: {source}")]
    Engine {
        operation: String,
        #[source]
        source: EngineError,
    },

    /// The engine returned nothing (or `null`) where a payload is required
    #[error("Engine returned no payload for {request}")]
    MissingPayload { request: String },

    /// The engine payload does not match the expected shape
    #[error("Failed to decode {request} response: {source}")]
    Decode {
        request: String,
        #[source]
        source: serde_json::Error,
    },

    /// Both halves of a paged dual fetch failed
    #[error("Paged request failed: page: {page}; count: {count}")]
    Paged { page: Box<Error>, count: Box<Error> },

    /// The manager has been disposed
    #[error("Presentation manager has been disposed")]
    Disposed,

    /// Hierarchy comparison across different rulesets
    #[error("Cannot compare hierarchies of different rulesets: {prev} and {curr}")]
    RulesetMismatch { prev: String, curr: String },

    /// Configuration file could not be parsed
    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    /// Configuration file extension not recognized
    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    /// Configuration value out of range
    #[error("Invalid config value for {key}: {message}")]
    InvalidConfig { key: String, message: String },

    /// Record-store error
    #[error(transparent)]
    Store(#[from] pres_store::Error),

    /// Value-type error from pres-types
    #[error(transparent)]
    Types(#[from] pres_types::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an engine failure with the name of the failed call.
    pub fn engine(operation: impl fmt::Display, source: EngineError) -> Self {
        Error::Engine {
            operation: operation.to_string(),
            source,
        }
    }

    /// The failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Engine { .. }
            | Error::MissingPayload { .. }
            | Error::Decode { .. }
            | Error::Paged { .. }
            | Error::Types(_)
            | Error::Json(_) => ErrorKind::Protocol,
            Error::Disposed
            | Error::RulesetMismatch { .. }
            | Error::Store(pres_store::Error::UnknownSelectionScope { .. }) => ErrorKind::Usage,
            Error::Store(_) => ErrorKind::Store,
            Error::ConfigParse { .. }
            | Error::UnsupportedFormat { .. }
            | Error::InvalidConfig { .. }
            | Error::Io(_) => ErrorKind::Config,
        }
    }
}
