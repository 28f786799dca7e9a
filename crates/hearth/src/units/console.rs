//! Console connector pool
//!
//! Connectors write lines to the host's log under the `hearth::console` target. The
//! least used connector is handed out first.

use super::system::{ProbeReport, StatusProbe};
use hearth_domain::ports::{Component, PooledObject, ResolveExt};
use hearth_domain::Result;
use hearth_infrastructure::di::{CONFIGURATION_UNITS, ConfigurationUnit, Registrar, UnitEntry};
use hearth_infrastructure::modules::{
    ExtensionAttributes, Module, ModuleCore, ModuleExtension, OwnerSlot,
};
use hearth_infrastructure::pool::OrderedPool;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Name of the console pool
pub const CONSOLE_POOL: &str = "console";

/// Default number of console connectors
const DEFAULT_CONSOLE_CAPACITY: usize = 4;

/// Prefix used when the pool's settings blob is empty
const DEFAULT_CONSOLE_PREFIX: &str = "hearth";

/// A connector writing to the console
#[derive(Debug)]
pub struct ConsoleConnector {
    id: u64,
    prefix: String,
    lines: u64,
}

impl ConsoleConnector {
    /// Create an uninitialized connector
    pub fn new(id: u64) -> Self {
        Self {
            id,
            prefix: String::new(),
            lines: 0,
        }
    }

    /// Connector id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Prefix taken from the pool settings
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Lines written so far
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Write one line
    pub fn write_line(&mut self, line: &str) {
        self.lines += 1;
        info!(
            target: "hearth::console",
            connector = self.id,
            "[{}] {line}",
            self.prefix
        );
    }
}

impl PooledObject for ConsoleConnector {
    fn initialize(&mut self, settings: &str) -> Result<()> {
        let prefix = settings.trim();
        self.prefix = if prefix.is_empty() {
            DEFAULT_CONSOLE_PREFIX.to_string()
        } else {
            prefix.to_string()
        };
        Ok(())
    }

    fn order_key(&self) -> i64 {
        i64::try_from(self.lines).unwrap_or(i64::MAX)
    }
}

struct ConsoleModule {
    core: ModuleCore,
}

impl Component for ConsoleModule {}

impl Module for ConsoleModule {
    fn core(&self) -> &ModuleCore {
        &self.core
    }
}

/// Probe reporting console pool usage
struct PoolProbe {
    owner: OwnerSlot,
    pool: Arc<OrderedPool<ConsoleConnector>>,
}

impl ModuleExtension for PoolProbe {
    fn owner_slot(&self) -> &OwnerSlot {
        &self.owner
    }
}

impl StatusProbe for PoolProbe {
    fn name(&self) -> &str {
        "console-pool"
    }

    fn probe(&self) -> Result<ProbeReport> {
        let owner = self.owner()?;
        let in_use = self.pool.in_use();
        let healthy = self.pool.capacity().is_none_or(|capacity| in_use < capacity);
        Ok(ProbeReport {
            name: self.name().to_string(),
            healthy,
            detail: format!(
                "{}: {} connectors, {in_use} in use",
                owner.core().caption(),
                self.pool.len()
            ),
        })
    }
}

struct ConsoleUnit;

impl ConfigurationUnit for ConsoleUnit {
    fn name(&self) -> &str {
        "console"
    }

    fn declare_bindings(&self, registrar: &Registrar<'_>) -> Result<()> {
        let next_id = Arc::new(AtomicU64::new(1));
        registrar.pool(CONSOLE_POOL, Some(DEFAULT_CONSOLE_CAPACITY), move || {
            Ok(ConsoleConnector::new(next_id.fetch_add(1, Ordering::Relaxed)))
        })?;

        registrar
            .module("console", "Console", |_, core| {
                Ok(Arc::new(ConsoleModule { core }))
            })?
            .permission("console.write", "Write lines to the console")
            .extension::<dyn StatusProbe, PoolProbe, _, _>(
                "pool",
                ExtensionAttributes::new().with("pool", CONSOLE_POOL),
                |ctx| {
                    Ok(Arc::new(PoolProbe {
                        owner: OwnerSlot::new(),
                        pool: ctx.get_named::<OrderedPool<ConsoleConnector>>(CONSOLE_POOL)?,
                    }))
                },
                |probe| probe as Arc<dyn StatusProbe>,
            )?;
        Ok(())
    }
}

fn console_unit() -> Arc<dyn ConfigurationUnit> {
    Arc::new(ConsoleUnit)
}

#[linkme::distributed_slice(CONFIGURATION_UNITS)]
static CONSOLE_UNIT: UnitEntry = UnitEntry {
    name: "console",
    description: "Console connector pool",
    priority: 0,
    factory: console_unit,
};
