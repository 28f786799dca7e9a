//! Heartbeat
//!
//! A lazy component: nothing is built until the host first asks for the [`Heartbeat`],
//! which also runs this unit's one-time activation.

use super::console::{CONSOLE_POOL, ConsoleConnector};
use hearth_domain::ports::{Component, Resolve, ResolveExt};
use hearth_domain::Result;
use hearth_infrastructure::config::RuntimeSettings;
use hearth_infrastructure::di::{
    Binding, CONFIGURATION_UNITS, ConfigurationUnit, Registrar, UnitEntry,
};
use hearth_infrastructure::pool::OrderedPool;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::info;

/// Settings table of the heartbeat, `[components.heartbeat]`
const HEARTBEAT_SETTINGS: &str = "heartbeat";

/// Seconds between beats unless `interval_secs` is configured
const DEFAULT_INTERVAL_SECS: u64 = 30;

/// Periodic liveness line written through the console pool
pub struct Heartbeat {
    console: Arc<OrderedPool<ConsoleConnector>>,
    interval: Duration,
    beats: AtomicU64,
}

impl Heartbeat {
    /// Time between beats
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Beats so far
    pub fn beats(&self) -> u64 {
        self.beats.load(Ordering::Relaxed)
    }

    /// Write one beat; returns its number
    pub fn beat(&self) -> Result<u64> {
        let mut console = self.console.acquire()?;
        let beat = self.beats.fetch_add(1, Ordering::Relaxed) + 1;
        console.write_line(&format!("heartbeat #{beat}"));
        Ok(beat)
    }
}

impl Component for Heartbeat {
    fn on_started(&self) -> Result<()> {
        info!(interval_secs = self.interval.as_secs(), "Heartbeat started");
        Ok(())
    }

    fn on_stop(&self) -> Result<()> {
        info!(beats = self.beats(), "Heartbeat stopped");
        Ok(())
    }
}

struct HeartbeatUnit;

impl ConfigurationUnit for HeartbeatUnit {
    fn name(&self) -> &str {
        "heartbeat"
    }

    fn declare_lazy_bindings(&self, registrar: &Registrar<'_>) -> Result<()> {
        registrar.register(
            Binding::singleton(|ctx| {
                let settings = ctx.get::<RuntimeSettings>()?;
                let interval_secs = settings
                    .component(HEARTBEAT_SETTINGS)
                    .get_or("interval_secs", DEFAULT_INTERVAL_SECS)?;
                Ok(Arc::new(Heartbeat {
                    console: ctx.get_named::<OrderedPool<ConsoleConnector>>(CONSOLE_POOL)?,
                    interval: Duration::from_secs(interval_secs.max(1)),
                    beats: AtomicU64::new(0),
                }))
            })
            .with_lifecycle(|heartbeat| heartbeat as Arc<dyn Component>),
        )
    }

    fn on_first_activation(&self, resolver: &dyn Resolve) -> Result<()> {
        let console = resolver.get_named::<OrderedPool<ConsoleConnector>>(CONSOLE_POOL)?;
        info!(pool = console.name(), "Heartbeat activated");
        Ok(())
    }
}

fn heartbeat_unit() -> Arc<dyn ConfigurationUnit> {
    Arc::new(HeartbeatUnit)
}

#[linkme::distributed_slice(CONFIGURATION_UNITS)]
static HEARTBEAT_UNIT: UnitEntry = UnitEntry {
    name: "heartbeat",
    description: "Lazily activated heartbeat",
    priority: 10,
    factory: heartbeat_unit,
};
