//! Journal implementations
//!
//! Implementations of the [`EventJournal`] port. The runtime selects one from
//! `journal.backend` unless a journal is injected through the builder.

use crate::config::{JournalBackend, JournalConfig};
use hearth_domain::events::{EventSeverity, OperationalEvent};
use hearth_domain::ports::EventJournal;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Create the journal selected by `config`
pub fn journal_from_config(config: &JournalConfig) -> Arc<dyn EventJournal> {
    match config.backend {
        JournalBackend::Tracing => Arc::new(TracingJournal),
        JournalBackend::Broadcast => Arc::new(BroadcastJournal::new(config.capacity)),
        JournalBackend::Null => Arc::new(NullJournal),
    }
}

// ============================================================================
// Tracing Journal (Default)
// ============================================================================

/// Journal that writes every event to the tracing subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingJournal;

impl EventJournal for TracingJournal {
    fn record(&self, event: OperationalEvent) {
        let related = event
            .related
            .as_ref()
            .map(|r| format!("{}:{}", r.kind, r.id))
            .unwrap_or_default();
        let detail = event.detail.as_deref().unwrap_or_default();
        let cause = event.error.as_deref().unwrap_or_default();
        match event.severity {
            EventSeverity::Info => info!(
                target: "hearth::journal",
                category = %event.category,
                related = %related,
                detail = %detail,
                "{}", event.summary
            ),
            EventSeverity::Warning => warn!(
                target: "hearth::journal",
                category = %event.category,
                related = %related,
                detail = %detail,
                error = %cause,
                "{}", event.summary
            ),
            EventSeverity::Error => error!(
                target: "hearth::journal",
                category = %event.category,
                related = %related,
                detail = %detail,
                error = %cause,
                "{}", event.summary
            ),
        }
    }
}

// ============================================================================
// Broadcast Journal
// ============================================================================

/// Journal that fans events out to in-process subscribers
///
/// Events recorded while nobody subscribes are dropped. Slow subscribers observe
/// `RecvError::Lagged` once the channel capacity is exceeded.
#[derive(Debug, Clone)]
pub struct BroadcastJournal {
    sender: broadcast::Sender<OperationalEvent>,
}

impl BroadcastJournal {
    /// Create a journal with the given channel capacity
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to events recorded from now on
    pub fn subscribe(&self) -> broadcast::Receiver<OperationalEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventJournal for BroadcastJournal {
    fn record(&self, event: OperationalEvent) {
        if self.sender.send(event).is_err() {
            debug!("Journal event dropped: no subscribers");
        }
    }
}

// ============================================================================
// Null Journal (Testing)
// ============================================================================

/// Journal that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullJournal;

impl EventJournal for NullJournal {
    fn record(&self, _event: OperationalEvent) {}
}
