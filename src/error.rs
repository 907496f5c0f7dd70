//! Error types for InsightGen.
//!
//! Each pipeline stage fails with its own variant so callers branch on the
//! kind of failure rather than on message text.

use thiserror::Error;

/// Main error type for InsightGen operations.
#[derive(Error, Debug)]
pub enum InsightError {
    /// Model service unreachable, rejected the request, or returned nothing usable.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Generated or supplied SQL is not a read-only query.
    #[error("Unsafe query: {0}")]
    UnsafeQuery(String),

    /// The store rejected the query (syntax error, missing column, etc.)
    #[error("Execution failed: {0}")]
    Execution(String),

    /// Caller input was unusable (empty question, malformed records).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Store could not be opened or a connection could not be acquired.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration errors (invalid config file, missing API key, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

}

impl InsightError {
    /// Creates a generation error with the given message.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Creates an unsafe-query error with the given message.
    pub fn unsafe_query(msg: impl Into<String>) -> Self {
        Self::UnsafeQuery(msg.into())
    }

    /// Creates an execution error with the given message.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Creates an invalid-input error with the given message.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Generation(_) => "Generation Error",
            Self::UnsafeQuery(_) => "Unsafe Query",
            Self::Execution(_) => "Execution Error",
            Self::InvalidInput(_) => "Invalid Input",
            Self::Connection(_) => "Connection Error",
            Self::Config(_) => "Configuration Error",
        }
    }

    /// Returns the bare message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Generation(m)
            | Self::UnsafeQuery(m)
            | Self::Execution(m)
            | Self::InvalidInput(m)
            | Self::Connection(m)
            | Self::Config(m) => m,
        }
    }
}

/// Result type alias using InsightError.
pub type Result<T> = std::result::Result<T, InsightError>;
