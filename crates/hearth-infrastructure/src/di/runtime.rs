//! Runtime facade
//!
//! The single process-wide value owning the registry, resolver, lifecycle
//! coordinator, journal, settings and module catalog. Build it once at process entry
//! and clone it wherever resolution is needed.
//!
//! ## Startup sequence
//!
//! 1. `NotStarted -> Starting`
//! 2. every unit's `declare_bindings`, in unit order
//! 3. every unit's `declare_lazy_bindings`, in unit order
//! 4. the eager class is sealed
//! 5. eager bindings are resolved by `(start_order, sequence)`; the first failure
//!    moves the runtime to `Failed` and is returned
//! 6. `on_started` for every singleton constructed so far
//! 7. every unit's `after_bindings_ready`
//! 8. start listeners, in construction order
//! 9. the lazy class is sealed and the runtime is `Started`

use super::binding::{Binding, BindingBuilder};
use super::lifecycle::{LifecycleCoordinator, ShutdownReport};
use super::registry::BindingRegistry;
use super::resolver::Resolver;
use super::unit::{ConfigurationUnit, Registrar, registered_units};
use crate::config::{AppConfig, RuntimeSettings, loader::validate_app_config};
use crate::journal::journal_from_config;
use crate::modules::ModuleCatalog;
use hearth_domain::constants::JOURNAL_CATEGORY_LIFECYCLE;
use hearth_domain::error::Result;
use hearth_domain::events::OperationalEvent;
use hearth_domain::ports::{EventJournal, Resolve};
use hearth_domain::{
    Activation, ConstructionState, ContractKey, Instance, Lifetime, RuntimeState,
};
use serde::Serialize;
use std::any::TypeId;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Status row of one binding
#[derive(Debug, Clone, Serialize)]
pub struct ComponentInfo {
    /// Contract served
    pub contract: String,
    /// Lifetime
    pub lifetime: Lifetime,
    /// Activation mode
    pub activation: Activation,
    /// Construction state; `None` for transients
    pub state: Option<ConstructionState>,
}

struct RuntimeInner {
    registry: Arc<BindingRegistry>,
    lifecycle: Arc<LifecycleCoordinator>,
    resolver: Resolver,
    units: Vec<Arc<dyn ConfigurationUnit>>,
    settings: RuntimeSettings,
    journal: Arc<dyn EventJournal>,
    catalog: Arc<ModuleCatalog>,
}

/// The component hosting runtime
#[derive(Clone)]
pub struct Runtime {
    inner: Arc<RuntimeInner>,
}

impl Runtime {
    /// Start building a runtime
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Current state
    pub fn state(&self) -> RuntimeState {
        self.inner.lifecycle.state()
    }

    /// Run the startup sequence
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` when the runtime is not `NotStarted`; otherwise the
    /// first error raised by a unit, an eager construction, a lifecycle hook or a start
    /// listener, after which the runtime is `Failed`.
    pub fn start(&self) -> Result<()> {
        let inner = &self.inner;
        inner.lifecycle.transition(RuntimeState::Starting)?;
        info!(units = inner.units.len(), "Starting runtime");

        match self.run_startup() {
            Ok(()) => {
                inner.lifecycle.transition(RuntimeState::Started)?;
                info!(bindings = inner.registry.len(), "Runtime started");
                inner.journal.record(OperationalEvent::info(
                    JOURNAL_CATEGORY_LIFECYCLE,
                    "Runtime started",
                ));
                Ok(())
            }
            Err(e) => {
                inner.lifecycle.transition(RuntimeState::Failed)?;
                error!(error = %e, "Runtime startup failed");
                inner.journal.record(
                    OperationalEvent::error(JOURNAL_CATEGORY_LIFECYCLE, "Runtime startup failed")
                        .with_error(&e),
                );
                Err(e)
            }
        }
    }

    fn run_startup(&self) -> Result<()> {
        let inner = &self.inner;

        for unit in &inner.units {
            debug!(unit = unit.name(), "Declaring bindings");
            unit.declare_bindings(&self.registrar())?;
        }

        for unit in &inner.units {
            let activated = Arc::clone(unit);
            let group = inner.registry.add_group(
                unit.name(),
                Arc::new(move |resolver: &dyn Resolve| activated.on_first_activation(resolver)),
            );
            debug!(unit = unit.name(), "Declaring lazy bindings");
            unit.declare_lazy_bindings(&self.registrar_for(Some(group)))?;
        }

        inner.registry.seal(Activation::Eager);

        for binding in inner.registry.eager_bindings() {
            debug!(
                contract = %binding.key(),
                start_order = binding.start_order(),
                "Resolving eager binding"
            );
            inner.resolver.resolve(binding.key())?;
        }

        let listeners = inner.lifecycle.close_batch()?;

        for unit in &inner.units {
            unit.after_bindings_ready(&inner.resolver)?;
        }

        for listener in listeners {
            listener.on_startup_complete(&inner.resolver)?;
        }

        inner.registry.seal(Activation::Lazy);
        Ok(())
    }

    /// Stop every started component in reverse construction order
    ///
    /// Stop hook failures are logged, journaled and reported; they never prevent the
    /// remaining hooks from running.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` unless the runtime is `Started` or `Failed`.
    pub fn stop(&self) -> Result<ShutdownReport> {
        let inner = &self.inner;
        inner.lifecycle.transition(RuntimeState::Stopping)?;
        info!("Stopping runtime");

        let report = inner.lifecycle.stop_all(inner.journal.as_ref());
        inner.resolver.clear_records();
        inner.lifecycle.transition(RuntimeState::Stopped)?;

        info!(
            stopped = report.stopped,
            failures = report.failures.len(),
            "Runtime stopped"
        );
        inner.journal.record(
            OperationalEvent::info(JOURNAL_CATEGORY_LIFECYCLE, "Runtime stopped").with_detail(
                format!(
                    "{} components stopped, {} stop hooks failed",
                    report.stopped,
                    report.failures.len()
                ),
            ),
        );
        Ok(report)
    }

    /// Register a binding outside of any configuration unit
    pub fn register<I>(&self, builder: BindingBuilder<I>) -> Result<()>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.registrar().register(builder)
    }

    /// Registration surface outside of any configuration unit
    pub fn registrar(&self) -> Registrar<'_> {
        self.registrar_for(None)
    }

    fn registrar_for(&self, group: Option<usize>) -> Registrar<'_> {
        Registrar {
            registry: &self.inner.registry,
            catalog: &self.inner.catalog,
            settings: &self.inner.settings,
            journal: &self.inner.journal,
            group,
        }
    }

    /// Status of every binding in registration order
    pub fn components(&self) -> Vec<ComponentInfo> {
        self.inner
            .registry
            .bindings()
            .iter()
            .map(|binding| ComponentInfo {
                contract: binding.key().to_string(),
                lifetime: binding.lifetime(),
                activation: binding.activation(),
                state: self.inner.resolver.construction_state(binding.key()),
            })
            .collect()
    }

    /// Contracts of started singletons in construction order
    pub fn construction_order(&self) -> Vec<ContractKey> {
        self.inner.lifecycle.construction_order()
    }

    /// Names of the configuration units, in declaration order
    pub fn unit_names(&self) -> Vec<String> {
        self.inner
            .units
            .iter()
            .map(|unit| unit.name().to_string())
            .collect()
    }

    /// Runtime settings
    pub fn settings(&self) -> &RuntimeSettings {
        &self.inner.settings
    }

    /// Runtime journal
    pub fn journal(&self) -> &Arc<dyn EventJournal> {
        &self.inner.journal
    }

    /// Module catalog
    pub fn catalog(&self) -> &Arc<ModuleCatalog> {
        &self.inner.catalog
    }

    /// Binding registry
    pub fn registry(&self) -> &Arc<BindingRegistry> {
        &self.inner.registry
    }
}

impl Resolve for Runtime {
    fn resolve(&self, key: &ContractKey) -> Result<Instance> {
        self.inner.resolver.resolve(key)
    }

    fn contains(&self, key: &ContractKey) -> bool {
        self.inner.resolver.contains(key)
    }

    fn contracts_of(&self, type_id: TypeId) -> Vec<ContractKey> {
        self.inner.resolver.contracts_of(type_id)
    }
}

/// Builder for [`Runtime`]
pub struct RuntimeBuilder {
    config: AppConfig,
    units: Vec<Arc<dyn ConfigurationUnit>>,
    include_registered: bool,
    journal: Option<Arc<dyn EventJournal>>,
    bindings: Vec<Binding>,
}

impl RuntimeBuilder {
    /// Create a builder with default configuration and no units
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            units: Vec::new(),
            include_registered: false,
            journal: None,
            bindings: Vec::new(),
        }
    }

    /// Use a loaded configuration
    #[must_use]
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a configuration unit; explicit units declare after link-time units
    #[must_use]
    pub fn with_unit(mut self, unit: impl ConfigurationUnit + 'static) -> Self {
        self.units.push(Arc::new(unit));
        self
    }

    /// Add a shared configuration unit
    #[must_use]
    pub fn with_shared_unit(mut self, unit: Arc<dyn ConfigurationUnit>) -> Self {
        self.units.push(unit);
        self
    }

    /// Include the units registered in `CONFIGURATION_UNITS`
    #[must_use]
    pub fn with_registered_units(mut self) -> Self {
        self.include_registered = true;
        self
    }

    /// Use `journal` instead of the configured backend
    #[must_use]
    pub fn with_journal(mut self, journal: Arc<dyn EventJournal>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Register a binding before any unit declares
    #[must_use]
    pub fn with_binding(mut self, binding: impl Into<Binding>) -> Self {
        self.bindings.push(binding.into());
        self
    }

    /// Build the runtime
    ///
    /// The journal, the settings and the module catalog are bound as instances so that
    /// components can depend on them.
    ///
    /// # Errors
    ///
    /// `Configuration` when the configuration does not validate; any registration
    /// error of the pre-registered bindings.
    pub fn build(self) -> Result<Runtime> {
        validate_app_config(&self.config)?;

        let settings = RuntimeSettings::new(self.config);
        let journal = self
            .journal
            .unwrap_or_else(|| journal_from_config(&settings.config().journal));

        let mut units: Vec<Arc<dyn ConfigurationUnit>> = Vec::new();
        if self.include_registered {
            for entry in registered_units() {
                if settings.is_unit_disabled(entry.name) {
                    info!(unit = entry.name, "Configuration unit disabled");
                    continue;
                }
                units.push((entry.factory)());
            }
        }
        units.extend(self.units);

        let registry = Arc::new(BindingRegistry::new());
        let lifecycle = Arc::new(LifecycleCoordinator::new());
        let catalog = Arc::new(ModuleCatalog::new());

        registry.register(Binding::instance::<dyn EventJournal>(Arc::clone(&journal)))?;
        registry.register(Binding::instance(Arc::new(settings.clone())))?;
        registry.register(Binding::instance(Arc::clone(&catalog)))?;
        for binding in self.bindings {
            registry.register(binding)?;
        }

        let resolver = Resolver::new(Arc::clone(&registry), Arc::clone(&lifecycle));
        Ok(Runtime {
            inner: Arc::new(RuntimeInner {
                registry,
                lifecycle,
                resolver,
                units,
                settings,
                journal,
                catalog,
            }),
        })
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
