//! # Hearth
//!
//! An in-process component hosting runtime: bind contracts to factories, let the runtime
//! construct singletons exactly once in dependency order, drive their lifecycle hooks,
//! and stop them in reverse order.
//!
//! ## Example
//!
//! ```ignore
//! use hearth::prelude::*;
//!
//! struct Greeter;
//!
//! let runtime = Runtime::builder().with_registered_units().build()?;
//! runtime.register(Binding::singleton(|_| Ok(Arc::new(Greeter))))?;
//! runtime.start()?;
//! let greeter = runtime.get::<Greeter>()?;
//! runtime.stop()?;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - Contracts, errors, events and the ports hosted components implement
//! - `infrastructure` - Registry, resolver, lifecycle, pools, modules, config, logging
//! - `units` - Built-in configuration units registered at link time
//! - `host` - The `hearth` host process

/// Domain layer - contracts, errors and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use hearth_domain::*;
}

/// Infrastructure layer - runtime, config and logging
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use hearth_infrastructure::*;
}

pub mod host;
pub mod units;

/// Everything a configuration unit or hosted component usually needs
pub mod prelude {
    pub use hearth_domain::ports::{
        Component, EventJournal, PermissionAssignments, PooledObject, Resolve, ResolveExt,
        StartListener,
    };
    pub use hearth_domain::{ContractKey, Error, OperationalEvent, Result};
    pub use hearth_infrastructure::config::{ComponentSettings, RuntimeSettings};
    pub use hearth_infrastructure::di::{
        Binding, BindingBuilder, CONFIGURATION_UNITS, ConfigurationUnit, Registrar,
        ResolutionContext, Runtime, RuntimeBuilder, UnitEntry,
    };
    pub use hearth_infrastructure::modules::{
        ExtensionAttributes, Module, ModuleCatalog, ModuleCore, ModuleExtension, OwnerSlot,
    };
    pub use hearth_infrastructure::pool::{Lease, OrderedPool};
    pub use std::sync::Arc;
}

// Re-export commonly used domain types at the crate root
pub use domain::{Error, Result};

// Re-export the runtime at the crate root
pub use infrastructure::{Runtime, RuntimeBuilder};
