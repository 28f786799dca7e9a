//! Lifetime, activation and state enums

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether resolution returns a shared or a per-call instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifetime {
    /// One instance per runtime, constructed exactly once
    Singleton,
    /// A fresh instance for every resolution, never cached
    Transient,
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Singleton => f.write_str("singleton"),
            Self::Transient => f.write_str("transient"),
        }
    }
}

/// Whether a binding is constructed during startup or on first use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activation {
    /// Constructed by the lifecycle coordinator while the runtime is starting
    Eager,
    /// Constructed (and its owning unit activated) by the first request
    Lazy,
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eager => f.write_str("eager"),
            Self::Lazy => f.write_str("lazy"),
        }
    }
}

/// Construction state of a component record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConstructionState {
    /// Never requested
    #[default]
    Uninitialized,
    /// Construction in flight on some thread
    Constructing,
    /// Instance available
    Ready,
    /// Construction failed; the failure is replayed to every caller
    Failed,
}

impl fmt::Display for ConstructionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Uninitialized => "uninitialized",
            Self::Constructing => "constructing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Process-wide runtime state
///
/// ```text
/// NotStarted -> Starting -> Started -> Stopping -> Stopped
///                   |                     ^
///                   +------> Failed ------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RuntimeState {
    /// Runtime built, nothing constructed by the coordinator yet
    #[default]
    NotStarted,
    /// Declaration and eager construction in progress
    Starting,
    /// Startup sequence complete
    Started,
    /// Startup aborted by an error
    Failed,
    /// Stop hooks running
    Stopping,
    /// Terminal state, all records destroyed
    Stopped,
}

impl RuntimeState {
    /// True when `next` directly follows `self` in the state machine
    pub fn can_transition_to(self, next: RuntimeState) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::Starting)
                | (Self::Starting, Self::Started | Self::Failed)
                | (Self::Started | Self::Failed, Self::Stopping)
                | (Self::Stopping, Self::Stopped)
        )
    }

    /// True for the terminal state
    pub fn is_terminal(self) -> bool {
        self == Self::Stopped
    }

    /// True once stopping began
    pub fn is_shutting_down(self) -> bool {
        matches!(self, Self::Stopping | Self::Stopped)
    }
}

impl fmt::Display for RuntimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotStarted => "not-started",
            Self::Starting => "starting",
            Self::Started => "started",
            Self::Failed => "failed",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        };
        f.write_str(label)
    }
}
