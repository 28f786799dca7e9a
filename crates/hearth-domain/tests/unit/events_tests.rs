//! Unit tests for operational events

use hearth_domain::constants::{JOURNAL_CATEGORY_POOL, RELATED_KIND_POOL};
use hearth_domain::{Error, EventSeverity, OperationalEvent, RelatedObject};

#[test]
fn test_event_builder() {
    let error = Error::component("handshake refused");
    let event = OperationalEvent::warning(JOURNAL_CATEGORY_POOL, "pool entry discarded")
        .with_detail("initialization failed")
        .with_error(&error)
        .with_related(RELATED_KIND_POOL, "console");

    assert_eq!(event.severity, EventSeverity::Warning);
    assert_eq!(event.category, "pool");
    assert_eq!(event.detail.as_deref(), Some("initialization failed"));
    assert_eq!(
        event.error.as_deref(),
        Some("Component error: handshake refused")
    );
    assert_eq!(event.related, Some(RelatedObject::new("pool", "console")));
}

#[test]
fn test_event_serialization_skips_empty_fields() {
    let event = OperationalEvent::info("lifecycle", "runtime started");
    let json = serde_json::to_value(&event).expect("serialize event");
    assert_eq!(json["severity"], "info");
    assert_eq!(json["summary"], "runtime started");
    assert!(json.get("detail").is_none());
    assert!(json.get("related").is_none());
}
