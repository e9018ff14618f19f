//! Event log error types.

use std::time::Duration;

use crate::codec::CodecError;

/// Result type for event log operations.
pub type Result<T> = std::result::Result<T, EventLogError>;

/// Errors that can occur while persisting or querying events.
///
/// `NotFound` is an expected outcome rather than a fault; callers can match
/// on it without inspecting messages.
#[derive(Debug, thiserror::Error)]
pub enum EventLogError {
    /// A schema statement failed. The store must not be used afterwards.
    #[cfg(feature = "sql")]
    #[error("Schema migration {index} failed: {source}")]
    Schema {
        index: usize,
        #[source]
        source: sqlx::Error,
    },

    #[error("Metadata encode error: {0}")]
    Encode(#[source] CodecError),

    /// A stored metadata document did not parse. Reported per row.
    #[error("Metadata decode error for event {code}: {source}")]
    Decode {
        code: String,
        #[source]
        source: CodecError,
    },

    #[cfg(feature = "sql")]
    #[error("Insert failed: {0}")]
    Insert(#[source] sqlx::Error),

    #[cfg(feature = "sql")]
    #[error("Query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("Event not found: code={code}")]
    NotFound { code: String },

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[cfg(feature = "sql")]
    #[error("Failed to connect to store: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EventLogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, EventLogError::NotFound { .. })
    }
}
