//! Unit tests for domain error types

use hearth_domain::{Error, RuntimeState};
use std::sync::Arc;

#[test]
fn test_binding_not_found_error() {
    let error = Error::binding_not_found("dyn Clock");
    assert!(error.is_binding_not_found());
    match error {
        Error::BindingNotFound { contract } => assert_eq!(contract, "dyn Clock"),
        _ => panic!("Expected BindingNotFound error"),
    }
}

#[test]
fn test_circular_dependency_display() {
    let error = Error::circular_dependency(["A", "B", "A"]);
    assert_eq!(
        error.to_string(),
        "Circular dependency detected: A -> B -> A"
    );
    assert!(error.is_circular_dependency());
}

#[test]
fn test_construction_failure_wraps_plain_errors() {
    let cause = Arc::new(Error::component("disk offline"));
    let error = Error::construction_failure("dyn Store", &cause);
    match &error {
        Error::ComponentConstruction { contract, source } => {
            assert_eq!(contract, "dyn Store");
            assert!(Arc::ptr_eq(source, &cause));
        }
        _ => panic!("Expected ComponentConstruction error"),
    }
    assert!(error.to_string().contains("disk offline"));
    assert!(matches!(error.root_cause(), Error::Component { .. }));
}

#[test]
fn test_construction_failure_replays_cycles() {
    let cause = Arc::new(Error::circular_dependency(["A", "B", "A"]));
    let error = Error::construction_failure("A", &cause);
    match error {
        Error::CircularDependency { chain } => assert_eq!(chain, vec!["A", "B", "A"]),
        _ => panic!("Expected CircularDependency error"),
    }
}

#[test]
fn test_predicates_look_through_wrapping() {
    let inner = Arc::new(Error::invalid_state("extension has no owner"));
    let outer = Arc::new(Error::construction_failure("B", &inner));
    let error = Error::construction_failure("A", &outer);
    assert!(error.is_invalid_state());
    assert!(!error.is_circular_dependency());
    assert!(matches!(error.root_cause(), Error::InvalidState { .. }));
}

#[test]
fn test_invalid_transition_display() {
    let error = Error::invalid_transition(RuntimeState::Started, RuntimeState::Starting);
    assert_eq!(
        error.to_string(),
        "Invalid runtime state transition: started -> starting"
    );
}

#[test]
fn test_pool_exhausted_error() {
    let error = Error::pool_exhausted("console", 2);
    assert!(error.is_pool_exhausted());
    match error {
        Error::PoolExhausted { pool, in_use } => {
            assert_eq!(pool, "console");
            assert_eq!(in_use, 2);
        }
        _ => panic!("Expected PoolExhausted error"),
    }
}

#[test]
fn test_io_error_from_std() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.toml");
    let error: Error = io_error.into();
    match error {
        Error::Io { message, source } => {
            assert!(message.contains("missing.toml"));
            assert!(source.is_some());
        }
        _ => panic!("Expected Io error"),
    }
}

#[test]
fn test_configuration_error_with_source() {
    let source = std::io::Error::other("bad file");
    let error = Error::configuration_with_source("Failed to read config", source);
    assert!(std::error::Error::source(&error).is_some());
    assert_eq!(error.to_string(), "Configuration error: Failed to read config");
}
