//! Dependency resolution and lifecycle
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`binding`] | Bindings and their builder |
//! | [`registry`] | Contract to binding table, sealed per activation class |
//! | [`resolver`] | Exactly-once singleton construction, cycle detection, lazy activation |
//! | [`lifecycle`] | Runtime state machine and lifecycle hook ordering |
//! | [`unit`] | Configuration units and their link-time registry |
//! | [`runtime`] | The runtime facade and its builder |

pub mod binding;
pub mod lifecycle;
pub(crate) mod record;
pub mod registry;
pub mod resolver;
pub mod runtime;
pub mod unit;

pub use binding::{Binding, BindingBuilder, Factory};
pub use lifecycle::{LifecycleCoordinator, ShutdownReport, StopFailure};
pub use registry::BindingRegistry;
pub use resolver::{ResolutionContext, Resolver};
pub use runtime::{ComponentInfo, Runtime, RuntimeBuilder};
pub use unit::{
    CONFIGURATION_UNITS, ConfigurationUnit, Registrar, UnitEntry, list_units, registered_units,
};
