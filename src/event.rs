//! Event entity.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{EventLogError, Result};
use crate::metadata::Metadata;

/// An event as built by the caller, before the store assigns `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub code: String,
    pub description: String,
    pub metadata: Metadata,
}

impl NewEvent {
    /// Create a validated event.
    ///
    /// Both `code` and `description` must be non-empty.
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        metadata: Metadata,
    ) -> Result<Self> {
        let event = Self {
            code: code.into(),
            description: description.into(),
            metadata,
        };
        event.validate()?;
        Ok(event)
    }

    /// Check the non-empty invariants. Fields are public, so the repository
    /// calls this again before writing.
    pub fn validate(&self) -> Result<()> {
        if self.code.is_empty() {
            return Err(EventLogError::InvalidEvent("code must not be empty".into()));
        }
        if self.description.is_empty() {
            return Err(EventLogError::InvalidEvent(format!(
                "description must not be empty (code={})",
                self.code
            )));
        }
        Ok(())
    }
}

/// A persisted event, reconstructed from a stored row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub code: String,
    pub description: String,
    pub metadata: Metadata,
    /// Assigned by the store at insert time.
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Code: {}", self.code)?;
        writeln!(f, "Description: {}", self.description)?;
        writeln!(f, "Metadata: {}", self.metadata)?;
        writeln!(
            f,
            "CreatedAt: {}",
            self.created_at.to_rfc3339_opts(SecondsFormat::Micros, true)
        )
    }
}
