//! Component records and the waits-for graph
//!
//! A record guards the one-time construction of a singleton (or the one-time
//! activation of a configuration unit). The first caller claims the record and builds
//! outside any lock; later callers block on the record's condition variable until it is
//! `Ready` or `Failed`.
//!
//! Before blocking, a caller adds an edge "this thread waits for the owner thread" to
//! the [`WaitGraph`]. An edge that would close a cycle is refused with
//! `CircularDependency`, which turns a cross-thread deadlock into an error.
//!
//! Lock order is always record, then graph.

use hearth_domain::error::{Error, Result};
use hearth_domain::{ConstructionState, ContractKey, Instance};
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// What a record guards
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ResolutionKey {
    /// Singleton construction of a contract
    Contract(ContractKey),
    /// One-time activation of the unit owning activation group `n`
    Activation(usize),
}

enum SlotState {
    Uninitialized,
    Constructing { owner: ThreadId },
    Ready(Instance),
    Failed(Arc<Error>),
}

/// Outcome of [`ComponentRecord::claim`]
pub(crate) enum Claim<'r> {
    Ready(Instance),
    Failed(Arc<Error>),
    Construct(ConstructionGuard<'r>),
}

/// Construction record of one singleton or activation group
pub(crate) struct ComponentRecord {
    key: ResolutionKey,
    label: String,
    state: Mutex<SlotState>,
    settled: Condvar,
}

impl ComponentRecord {
    pub(crate) fn new(key: ResolutionKey, label: String) -> Self {
        Self {
            key,
            label,
            state: Mutex::new(SlotState::Uninitialized),
            settled: Condvar::new(),
        }
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn state(&self) -> ConstructionState {
        match &*self.state.lock() {
            SlotState::Uninitialized => ConstructionState::Uninitialized,
            SlotState::Constructing { .. } => ConstructionState::Constructing,
            SlotState::Ready(_) => ConstructionState::Ready,
            SlotState::Failed(_) => ConstructionState::Failed,
        }
    }

    /// Get the settled outcome, or the right to construct
    ///
    /// Blocks while another thread constructs. Fails with `CircularDependency` when the
    /// calling thread already owns the construction, or when waiting would close a cycle
    /// of threads waiting on each other.
    pub(crate) fn claim<'r>(&'r self, waits: &'r WaitGraph) -> Result<Claim<'r>> {
        let me = thread::current().id();
        let mut state = self.state.lock();
        loop {
            match &*state {
                SlotState::Ready(instance) => return Ok(Claim::Ready(Arc::clone(instance))),
                SlotState::Failed(error) => return Ok(Claim::Failed(Arc::clone(error))),
                SlotState::Uninitialized => {
                    *state = SlotState::Constructing { owner: me };
                    return Ok(Claim::Construct(ConstructionGuard {
                        record: self,
                        waits,
                        owner: me,
                        settled: false,
                    }));
                }
                SlotState::Constructing { owner } if *owner == me => {
                    return Err(Error::circular_dependency([&self.label, &self.label]));
                }
                SlotState::Constructing { owner } => {
                    let owner = *owner;
                    waits.begin_wait(me, &self.key, &self.label, owner)?;
                    self.settled.wait(&mut state);
                    waits.end_wait(me);
                }
            }
        }
    }

    fn settle(&self, outcome: SlotState, waits: &WaitGraph, owner: ThreadId) {
        let mut state = self.state.lock();
        *state = outcome;
        waits.release_waiters(&self.key, owner);
        drop(state);
        self.settled.notify_all();
    }
}

/// Right to construct a claimed record
///
/// Dropping the guard without settling it (a panicking factory) marks the record
/// `Failed` and wakes every waiter.
pub(crate) struct ConstructionGuard<'r> {
    record: &'r ComponentRecord,
    waits: &'r WaitGraph,
    owner: ThreadId,
    settled: bool,
}

impl ConstructionGuard<'_> {
    pub(crate) fn complete(mut self, instance: Instance) {
        self.settled = true;
        self.record
            .settle(SlotState::Ready(instance), self.waits, self.owner);
    }

    pub(crate) fn fail(mut self, error: Arc<Error>) {
        self.settled = true;
        self.record
            .settle(SlotState::Failed(error), self.waits, self.owner);
    }
}

impl Drop for ConstructionGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let error = Error::internal(format!(
                "construction of {} panicked",
                self.record.label()
            ));
            self.record
                .settle(SlotState::Failed(Arc::new(error)), self.waits, self.owner);
        }
    }
}

struct WaitEdge {
    key: ResolutionKey,
    label: String,
    owner: ThreadId,
}

/// Waits-for graph between threads blocked on records
#[derive(Default)]
pub(crate) struct WaitGraph {
    edges: Mutex<HashMap<ThreadId, WaitEdge>>,
}

impl WaitGraph {
    /// Add the edge `waiter -> owner`, refusing it when it would close a cycle
    fn begin_wait(
        &self,
        waiter: ThreadId,
        key: &ResolutionKey,
        label: &str,
        owner: ThreadId,
    ) -> Result<()> {
        let mut edges = self.edges.lock();
        let mut chain = vec![label.to_string()];
        let mut current = owner;
        while let Some(edge) = edges.get(&current) {
            chain.push(edge.label.clone());
            if edge.owner == waiter {
                chain.push(label.to_string());
                return Err(Error::circular_dependency(chain));
            }
            current = edge.owner;
        }
        edges.insert(
            waiter,
            WaitEdge {
                key: key.clone(),
                label: label.to_string(),
                owner,
            },
        );
        Ok(())
    }

    fn end_wait(&self, waiter: ThreadId) {
        self.edges.lock().remove(&waiter);
    }

    /// Drop every edge pointing at a record that just settled
    fn release_waiters(&self, key: &ResolutionKey, owner: ThreadId) {
        self.edges
            .lock()
            .retain(|_, edge| !(edge.owner == owner && edge.key == *key));
    }
}

impl fmt::Display for ResolutionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contract(key) => write!(f, "{key}"),
            Self::Activation(group) => write!(f, "activation group #{group}"),
        }
    }
}
