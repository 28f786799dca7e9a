//! Operational event sink

use crate::events::OperationalEvent;

/// Sink for operational events
///
/// Recording never fails from the caller's point of view; implementations that can
/// lose events (full channel, no subscribers) drop them silently.
pub trait EventJournal: Send + Sync {
    /// Record an event
    fn record(&self, event: OperationalEvent);
}
