//! Operational events
//!
//! Events are written to the [`EventJournal`](crate::ports::EventJournal) port by the
//! runtime and by hosted components. They describe what happened operationally
//! (startup, shutdown, failed stop hooks, discarded pool entries) and are not part of
//! any component's business data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of an operational event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSeverity {
    /// Normal operation
    Info,
    /// Degraded but continuing
    Warning,
    /// An operation failed
    Error,
}

impl fmt::Display for EventSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => f.write_str("info"),
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Object an event refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedObject {
    /// Kind of object (`contract`, `pool`, `module`, ...)
    pub kind: String,
    /// Identifier within that kind
    pub id: String,
}

impl RelatedObject {
    /// Create a related object reference
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

/// A single journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationalEvent {
    /// When the event was created
    pub timestamp: DateTime<Utc>,
    /// Grouping category, see [`crate::constants`]
    pub category: String,
    /// Severity
    pub severity: EventSeverity,
    /// One-line summary
    pub summary: String,
    /// Optional longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Rendered error, when the event reports a failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Object the event is about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<RelatedObject>,
}

impl OperationalEvent {
    /// Create an event with the current timestamp
    pub fn new(
        category: impl Into<String>,
        severity: EventSeverity,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            category: category.into(),
            severity,
            summary: summary.into(),
            detail: None,
            error: None,
            related: None,
        }
    }

    /// Informational event
    pub fn info(category: impl Into<String>, summary: impl Into<String>) -> Self {
        Self::new(category, EventSeverity::Info, summary)
    }

    /// Warning event
    pub fn warning(category: impl Into<String>, summary: impl Into<String>) -> Self {
        Self::new(category, EventSeverity::Warning, summary)
    }

    /// Error event
    pub fn error(category: impl Into<String>, summary: impl Into<String>) -> Self {
        Self::new(category, EventSeverity::Error, summary)
    }

    /// Attach a longer description
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Attach the error that caused the event
    #[must_use]
    pub fn with_error(mut self, error: &dyn std::error::Error) -> Self {
        self.error = Some(error.to_string());
        self
    }

    /// Attach the object the event is about
    #[must_use]
    pub fn with_related(mut self, kind: impl Into<String>, id: impl Into<String>) -> Self {
        self.related = Some(RelatedObject::new(kind, id));
        self
    }
}
