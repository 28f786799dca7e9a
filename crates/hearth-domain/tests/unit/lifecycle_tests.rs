//! Unit tests for lifecycle enums

use hearth_domain::RuntimeState;

const ALL: [RuntimeState; 6] = [
    RuntimeState::NotStarted,
    RuntimeState::Starting,
    RuntimeState::Started,
    RuntimeState::Failed,
    RuntimeState::Stopping,
    RuntimeState::Stopped,
];

#[test]
fn test_legal_transitions() {
    let legal = [
        (RuntimeState::NotStarted, RuntimeState::Starting),
        (RuntimeState::Starting, RuntimeState::Started),
        (RuntimeState::Starting, RuntimeState::Failed),
        (RuntimeState::Started, RuntimeState::Stopping),
        (RuntimeState::Failed, RuntimeState::Stopping),
        (RuntimeState::Stopping, RuntimeState::Stopped),
    ];
    for from in ALL {
        for to in ALL {
            assert_eq!(
                from.can_transition_to(to),
                legal.contains(&(from, to)),
                "{from} -> {to}"
            );
        }
    }
}

#[test]
fn test_only_stopped_is_terminal() {
    let terminal: Vec<_> = ALL.into_iter().filter(|s| s.is_terminal()).collect();
    assert_eq!(terminal, vec![RuntimeState::Stopped]);
    assert_eq!(RuntimeState::default(), RuntimeState::NotStarted);
}
