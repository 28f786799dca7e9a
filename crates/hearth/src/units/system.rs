//! The `system` module
//!
//! Declares the host's own permissions and the [`StatusProbe`] extension point. Any
//! module can contribute a probe; [`SystemStatus`] runs every probe once startup is
//! complete.

use hearth_domain::ports::{Component, Resolve, ResolveExt, StartListener};
use hearth_domain::Result;
use hearth_infrastructure::di::{
    Binding, CONFIGURATION_UNITS, ConfigurationUnit, Registrar, UnitEntry,
};
use hearth_infrastructure::modules::{
    ExtensionAttributes, Module, ModuleCatalog, ModuleCore, ModuleExtension, OwnerSlot,
};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Id of the system module
pub const SYSTEM_MODULE_ID: &str = "system";

/// Result of one status probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    /// Probe name
    pub name: String,
    /// True when the probed component is usable
    pub healthy: bool,
    /// Human-readable detail
    pub detail: String,
}

/// Extension point for status probes
pub trait StatusProbe: ModuleExtension {
    /// Probe name
    fn name(&self) -> &str;

    /// Inspect the component behind the probe
    fn probe(&self) -> Result<ProbeReport>;
}

/// The host's own module
pub struct SystemModule {
    core: ModuleCore,
    started: OnceLock<Instant>,
}

impl SystemModule {
    fn new(core: ModuleCore) -> Self {
        Self {
            core,
            started: OnceLock::new(),
        }
    }

    /// Time since the module started; `None` before startup completed
    pub fn uptime(&self) -> Option<Duration> {
        self.started.get().map(Instant::elapsed)
    }
}

impl Component for SystemModule {
    fn on_started(&self) -> Result<()> {
        self.started.get_or_init(Instant::now);
        info!(module = self.core.id(), "System module started");
        Ok(())
    }

    fn on_stop(&self) -> Result<()> {
        info!(
            module = self.core.id(),
            uptime_secs = self.uptime().unwrap_or_default().as_secs(),
            "System module stopped"
        );
        Ok(())
    }
}

impl Module for SystemModule {
    fn core(&self) -> &ModuleCore {
        &self.core
    }
}

/// Probe reporting the host's uptime
struct RuntimeProbe {
    owner: OwnerSlot,
    system: Arc<SystemModule>,
}

impl ModuleExtension for RuntimeProbe {
    fn owner_slot(&self) -> &OwnerSlot {
        &self.owner
    }
}

impl StatusProbe for RuntimeProbe {
    fn name(&self) -> &str {
        "runtime"
    }

    fn probe(&self) -> Result<ProbeReport> {
        let owner = self.owner()?;
        let report = match self.system.uptime() {
            Some(uptime) => ProbeReport {
                name: self.name().to_string(),
                healthy: true,
                detail: format!(
                    "{} up for {}s with {} permissions",
                    owner.core().caption(),
                    uptime.as_secs(),
                    owner.core().permissions().len()
                ),
            },
            None => ProbeReport {
                name: self.name().to_string(),
                healthy: false,
                detail: format!("{} has not started", owner.caption()),
            },
        };
        Ok(report)
    }
}

/// Runs every status probe once the runtime has started
#[derive(Debug, Default)]
pub struct SystemStatus;

impl SystemStatus {
    /// Run every registered status probe
    pub fn collect(&self, resolver: &dyn Resolve) -> Result<Vec<ProbeReport>> {
        let catalog = resolver.get::<ModuleCatalog>()?;
        catalog
            .create_extensions::<dyn StatusProbe>(resolver)?
            .iter()
            .map(|probe| probe.probe())
            .collect()
    }
}

impl StartListener for SystemStatus {
    fn on_startup_complete(&self, resolver: &dyn Resolve) -> Result<()> {
        for report in self.collect(resolver)? {
            if report.healthy {
                info!(probe = %report.name, detail = %report.detail, "Status probe");
            } else {
                warn!(probe = %report.name, detail = %report.detail, "Status probe unhealthy");
            }
        }
        Ok(())
    }
}

struct SystemUnit;

impl ConfigurationUnit for SystemUnit {
    fn name(&self) -> &str {
        "system"
    }

    fn declare_bindings(&self, registrar: &Registrar<'_>) -> Result<()> {
        registrar
            .module(SYSTEM_MODULE_ID, "System", |_, core| {
                Ok(Arc::new(SystemModule::new(core)))
            })?
            .permission("system.view-status", "View the status of hosted components")
            .permission("system.manage-units", "Enable or disable configuration units")
            .extension::<dyn StatusProbe, RuntimeProbe, _, _>(
                "runtime",
                ExtensionAttributes::new().with("kind", "uptime"),
                |ctx| {
                    Ok(Arc::new(RuntimeProbe {
                        owner: OwnerSlot::new(),
                        system: ctx.get_named::<SystemModule>(SYSTEM_MODULE_ID)?,
                    }))
                },
                |probe| probe as Arc<dyn StatusProbe>,
            )?;

        registrar.register(
            Binding::singleton(|_| Ok(Arc::new(SystemStatus)))
                .start_order(i32::MAX)
                .with_start_listener(|status| status as Arc<dyn StartListener>),
        )
    }
}

fn system_unit() -> Arc<dyn ConfigurationUnit> {
    Arc::new(SystemUnit)
}

#[linkme::distributed_slice(CONFIGURATION_UNITS)]
static SYSTEM_UNIT: UnitEntry = UnitEntry {
    name: "system",
    description: "System module, permissions and status probes",
    priority: -10,
    factory: system_unit,
};
