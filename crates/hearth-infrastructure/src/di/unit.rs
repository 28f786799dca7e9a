//! Configuration units
//!
//! A configuration unit contributes bindings to the runtime. Units are added explicitly
//! through the runtime builder or at link time through [`CONFIGURATION_UNITS`]:
//!
//! ```ignore
//! use hearth_infrastructure::di::{CONFIGURATION_UNITS, UnitEntry};
//!
//! #[linkme::distributed_slice(CONFIGURATION_UNITS)]
//! static CLOCK_UNIT: UnitEntry = UnitEntry {
//!     name: "clock",
//!     description: "System clock",
//!     priority: 0,
//!     factory: || Arc::new(ClockUnit),
//! };
//! ```
//!
//! Link-time units are collected in `(priority, name)` order, so the startup sequence
//! does not depend on link order.

use super::binding::{Binding, BindingBuilder};
use super::registry::BindingRegistry;
use crate::config::RuntimeSettings;
use crate::modules::ModuleCatalog;
use hearth_domain::error::Result;
use hearth_domain::ports::{EventJournal, Resolve};
use hearth_domain::Activation;
use std::sync::Arc;

/// Unit of binding declarations
///
/// Every method has an empty default so a unit implements only what it needs.
pub trait ConfigurationUnit: Send + Sync {
    /// Unique unit name
    fn name(&self) -> &str;

    /// Declare bindings during the eager declaration phase
    fn declare_bindings(&self, _registrar: &Registrar<'_>) -> Result<()> {
        Ok(())
    }

    /// Declare bindings during the lazy declaration phase
    ///
    /// Every binding declared here is lazy and belongs to this unit's activation group.
    fn declare_lazy_bindings(&self, _registrar: &Registrar<'_>) -> Result<()> {
        Ok(())
    }

    /// Runs once every eager binding is constructed and started
    fn after_bindings_ready(&self, _resolver: &dyn Resolve) -> Result<()> {
        Ok(())
    }

    /// Runs once, the first time one of this unit's lazy bindings is requested
    fn on_first_activation(&self, _resolver: &dyn Resolve) -> Result<()> {
        Ok(())
    }
}

/// Link-time registration entry for a configuration unit
pub struct UnitEntry {
    /// Unique unit name
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Ordering among link-time units; lower values declare first
    pub priority: i32,
    /// Factory function creating the unit
    pub factory: fn() -> Arc<dyn ConfigurationUnit>,
}

/// Configuration units contributed at link time
#[linkme::distributed_slice]
pub static CONFIGURATION_UNITS: [UnitEntry] = [..];

/// Link-time units in `(priority, name)` order
pub fn registered_units() -> Vec<&'static UnitEntry> {
    let mut units: Vec<&'static UnitEntry> = CONFIGURATION_UNITS.iter().collect();
    units.sort_by(|a, b| (a.priority, a.name).cmp(&(b.priority, b.name)));
    units
}

/// `(name, description)` of every link-time unit, in declaration order
pub fn list_units() -> Vec<(&'static str, &'static str)> {
    registered_units()
        .into_iter()
        .map(|entry| (entry.name, entry.description))
        .collect()
}

/// Registration surface handed to a configuration unit
pub struct Registrar<'a> {
    pub(crate) registry: &'a BindingRegistry,
    pub(crate) catalog: &'a ModuleCatalog,
    pub(crate) settings: &'a RuntimeSettings,
    pub(crate) journal: &'a Arc<dyn EventJournal>,
    pub(crate) group: Option<usize>,
}

impl Registrar<'_> {
    /// Register a binding
    ///
    /// In the lazy declaration phase the binding is made lazy and joins the declaring
    /// unit's activation group.
    pub fn register<I>(&self, builder: BindingBuilder<I>) -> Result<()>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.register_binding(builder.build())
    }

    pub(crate) fn register_binding(&self, mut binding: Binding) -> Result<()> {
        if let Some(group) = self.group {
            binding.activation = Some(Activation::Lazy);
            binding.group = Some(group);
        }
        self.registry.register(binding)
    }

    /// Runtime settings
    pub fn settings(&self) -> &RuntimeSettings {
        self.settings
    }

    /// Module catalog
    pub fn catalog(&self) -> &ModuleCatalog {
        self.catalog
    }

    /// Runtime journal
    pub fn journal(&self) -> &Arc<dyn EventJournal> {
        self.journal
    }

    /// True during the lazy declaration phase
    pub fn is_lazy_phase(&self) -> bool {
        self.group.is_some()
    }
}
