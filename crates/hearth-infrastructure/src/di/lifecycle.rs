//! Lifecycle coordinator
//!
//! Owns the runtime state machine and the construction log, the ordered list of
//! singletons that exposed lifecycle hooks or a start listener.
//!
//! ```text
//! NotStarted ──▶ Starting ──▶ Started ──▶ Stopping ──▶ Stopped
//!                   │                        ▲
//!                   └──────▶ Failed ─────────┘
//! ```
//!
//! While the startup batch is open, a newly constructed singleton only receives
//! `on_starting`; `on_started` and start-listener callbacks are delivered for the
//! whole batch, in construction order, once eager construction is over. Singletons
//! constructed after the batch closed receive them inline, right after their record
//! became `Ready`. Stop hooks run in exact reverse construction order. Once stopping
//! began, no singleton with hooks is admitted.

use hearth_domain::constants::{JOURNAL_CATEGORY_LIFECYCLE, RELATED_KIND_CONTRACT};
use hearth_domain::error::{Error, Result};
use hearth_domain::events::OperationalEvent;
use hearth_domain::ports::{Component, EventJournal, Resolve, StartListener};
use hearth_domain::{ContractKey, RuntimeState};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
struct LogEntry {
    key: ContractKey,
    lifecycle: Option<Arc<dyn Component>>,
    listener: Option<Arc<dyn StartListener>>,
}

struct ConstructionLog {
    batch_open: bool,
    stopping: bool,
    entries: Vec<LogEntry>,
}

/// Hooks still owed to a singleton admitted after the startup batch closed
pub(crate) struct LateStart {
    entry: LogEntry,
}

/// A stop hook that failed
#[derive(Debug, Clone, Serialize)]
pub struct StopFailure {
    /// Contract of the component
    pub contract: String,
    /// Rendered error
    pub error: String,
}

/// Outcome of stopping the runtime
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShutdownReport {
    /// Components whose stop hook ran
    pub stopped: usize,
    /// Stop hooks that failed; the remaining hooks still ran
    pub failures: Vec<StopFailure>,
}

impl ShutdownReport {
    /// True when every stop hook succeeded
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runtime state machine and construction log
pub struct LifecycleCoordinator {
    state: Mutex<RuntimeState>,
    log: Mutex<ConstructionLog>,
}

impl LifecycleCoordinator {
    /// Create a coordinator in `NotStarted` with an open startup batch
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RuntimeState::NotStarted),
            log: Mutex::new(ConstructionLog {
                batch_open: true,
                stopping: false,
                entries: Vec::new(),
            }),
        }
    }

    /// Current state
    pub fn state(&self) -> RuntimeState {
        *self.state.lock()
    }

    /// Move to `next`
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` when `next` does not directly follow the current state.
    pub fn transition(&self, next: RuntimeState) -> Result<()> {
        let mut state = self.state.lock();
        if !state.can_transition_to(next) {
            return Err(Error::invalid_transition(*state, next));
        }
        info!(from = %*state, to = %next, "Runtime state changed");
        *state = next;
        Ok(())
    }

    /// Contracts of logged singletons in construction order
    pub fn construction_order(&self) -> Vec<ContractKey> {
        self.log
            .lock()
            .entries
            .iter()
            .map(|entry| entry.key.clone())
            .collect()
    }

    /// Deliver `on_starting` to a new singleton and log it
    ///
    /// Runs before the singleton's record becomes `Ready`, so a failing hook fails the
    /// construction. Past the startup batch, the remaining hooks are returned as a
    /// [`LateStart`] for [`Self::start_late`].
    pub(crate) fn admit(
        &self,
        key: &ContractKey,
        lifecycle: Option<Arc<dyn Component>>,
        listener: Option<Arc<dyn StartListener>>,
    ) -> Result<Option<LateStart>> {
        if lifecycle.is_none() && listener.is_none() {
            return Ok(None);
        }
        if let Some(component) = &lifecycle {
            component.on_starting()?;
        }

        let entry = LogEntry {
            key: key.clone(),
            lifecycle,
            listener,
        };
        let mut log = self.log.lock();
        if log.stopping {
            return Err(Error::invalid_state(format!(
                "cannot start {key}: the runtime is stopping"
            )));
        }
        log.entries.push(entry.clone());
        if log.batch_open {
            return Ok(None);
        }
        Ok(Some(LateStart { entry }))
    }

    /// Deliver `on_started` and the start-listener callback to a late singleton
    ///
    /// `resolver` must not hold the singleton on its construction path, so the
    /// listener can resolve it.
    pub(crate) fn start_late(&self, late: LateStart, resolver: &dyn Resolve) -> Result<()> {
        let entry = late.entry;
        if let Some(component) = &entry.lifecycle {
            component.on_started()?;
        }
        if let Some(listener) = &entry.listener {
            listener.on_startup_complete(resolver)?;
        }
        debug!(contract = %entry.key, "Started component outside the startup batch");
        Ok(())
    }

    /// Close the startup batch and run `on_started` for it in construction order
    ///
    /// Returns the batch's start listeners, in construction order, for notification
    /// once the configuration units finished their post-binding step.
    pub(crate) fn close_batch(&self) -> Result<Vec<Arc<dyn StartListener>>> {
        let batch = {
            let mut log = self.log.lock();
            log.batch_open = false;
            log.entries.clone()
        };
        for entry in &batch {
            if let Some(component) = &entry.lifecycle {
                debug!(contract = %entry.key, "Starting component");
                component.on_started()?;
            }
        }
        Ok(batch.into_iter().filter_map(|entry| entry.listener).collect())
    }

    /// Run every stop hook in reverse construction order and empty the log
    pub(crate) fn stop_all(&self, journal: &dyn EventJournal) -> ShutdownReport {
        let entries = {
            let mut log = self.log.lock();
            log.stopping = true;
            std::mem::take(&mut log.entries)
        };
        let mut report = ShutdownReport::default();
        for entry in entries.iter().rev() {
            let Some(component) = &entry.lifecycle else {
                continue;
            };
            debug!(contract = %entry.key, "Stopping component");
            report.stopped += 1;
            if let Err(error) = component.on_stop() {
                warn!(contract = %entry.key, error = %error, "Stop hook failed");
                journal.record(
                    OperationalEvent::warning(JOURNAL_CATEGORY_LIFECYCLE, "Stop hook failed")
                        .with_error(&error)
                        .with_related(RELATED_KIND_CONTRACT, entry.key.to_string()),
                );
                report.failures.push(StopFailure {
                    contract: entry.key.to_string(),
                    error: error.to_string(),
                });
            }
        }
        report
    }
}

impl Default for LifecycleCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
