//! Journal configuration types

use crate::constants::DEFAULT_JOURNAL_CAPACITY;
use serde::{Deserialize, Serialize};

/// Journal implementation selected at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalBackend {
    /// Write events to the tracing subscriber
    #[default]
    Tracing,
    /// Fan events out on an in-process broadcast channel
    Broadcast,
    /// Discard events
    Null,
}

/// Journal configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Backend
    pub backend: JournalBackend,

    /// Channel capacity of the broadcast backend
    pub capacity: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            backend: JournalBackend::default(),
            capacity: DEFAULT_JOURNAL_CAPACITY,
        }
    }
}
