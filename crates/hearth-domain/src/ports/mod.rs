//! Domain Port Interfaces
//!
//! Contracts between the runtime and the code it hosts.
//!
//! ## Organization
//!
//! - **resolve** - Resolution of contracts into instances, implemented by the runtime
//! - **component** - Lifecycle hooks and start listeners, implemented by hosted components
//! - **pool** - Objects managed by an ordered pool
//! - **journal** - Sink for operational events
//! - **permissions** - External permission assignment lookup

/// Contract resolution
pub mod resolve;
/// Component lifecycle hooks
pub mod component;
/// Pooled object contract
pub mod pool;
/// Operational event sink
pub mod journal;
/// Permission assignment lookup
pub mod permissions;

pub use component::{Component, StartListener};
pub use journal::EventJournal;
pub use permissions::PermissionAssignments;
pub use pool::PooledObject;
pub use resolve::{Resolve, ResolveExt};
