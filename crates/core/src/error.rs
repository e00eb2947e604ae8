//! Error types for the mapping core
//!
//! Every fallible operation in the workspace returns [`Result`].
//! Besides limit, I/O and config failures, errors fall in three groups:
//! - structural corruption found while reassembling rows ([`Error::Corruption`])
//! - caller-contract defects ([`Error::InvariantViolation`])
//! - collaborator failures, propagated without retry
//!   ([`Error::Allocator`], [`Error::Resolver`], [`Error::Cursor`])

use crate::limits::LimitError;
use std::io;
use thiserror::Error;

/// Result type alias for mapping operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the mapping core
#[derive(Debug, Error)]
pub enum Error {
    /// Rows read back do not describe a valid document tree
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// A caller broke the contract of the mapping core
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// The row id allocator failed
    #[error("Allocator error: {0}")]
    Allocator(String),

    /// The doc part schema resolver failed
    #[error("Resolver error: {0}")]
    Resolver(String),

    /// The row source cursor failed
    #[error("Cursor error: {0}")]
    Cursor(String),

    /// A document exceeded a configured limit
    #[error("Limit exceeded: {0}")]
    Limit(#[from] LimitError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (configuration files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Structural corruption
    pub fn corruption(msg: impl Into<String>) -> Self {
        Error::Corruption(msg.into())
    }

    /// Caller-contract defect
    pub fn invariant(msg: impl Into<String>) -> Self {
        Error::InvariantViolation(msg.into())
    }

    /// Whether this error reports corrupted rows
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::Corruption(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}
