//! Process host
//!
//! Loads the configuration, initializes logging, builds the runtime from every
//! link-time unit and runs it until Ctrl+C.

use crate::units::Heartbeat;
use anyhow::{Context, bail};
use hearth_domain::ports::ResolveExt;
use hearth_infrastructure::config::{AppConfig, ConfigLoader};
use hearth_infrastructure::di::{Runtime, ShutdownReport};
use hearth_infrastructure::logging::init_logging;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Options of a host run
#[derive(Debug, Clone, Default)]
pub struct HostOptions {
    /// Configuration file; the default locations are searched when absent
    pub config_path: Option<PathBuf>,
    /// Start, report and stop instead of serving
    pub check: bool,
}

/// Load the configuration for `options`
pub fn load_config(options: &HostOptions) -> anyhow::Result<AppConfig> {
    let loader = match &options.config_path {
        Some(path) => ConfigLoader::new().with_config_path(path),
        None => ConfigLoader::new(),
    };
    loader.load().context("Failed to load configuration")
}

/// Run the host
///
/// # Errors
///
/// Configuration errors, and the startup error when the runtime fails to start.
pub async fn run(options: HostOptions) -> anyhow::Result<ShutdownReport> {
    let config = load_config(&options)?;
    if let Err(e) = init_logging(&config.logging) {
        warn!(error = %e, "Keeping the installed logging subscriber");
    }

    let stop_on_failed_start = config.runtime.stop_on_failed_start;
    let runtime = Runtime::builder()
        .with_config(config)
        .with_registered_units()
        .build()
        .context("Failed to build runtime")?;
    info!(units = ?runtime.unit_names(), "Starting hearth");

    let starting = runtime.clone();
    if let Err(e) = tokio::task::spawn_blocking(move || starting.start()).await? {
        error!(error = %e, "Startup failed");
        if stop_on_failed_start {
            let report = runtime.stop().context("Failed to stop after failed startup")?;
            info!(stopped = report.stopped, "Stopped components of the failed startup");
        }
        return Err(e).context("Failed to start runtime");
    }

    if !options.check {
        serve(&runtime).await?;
    }

    let stopping = runtime.clone();
    let report = tokio::task::spawn_blocking(move || stopping.stop())
        .await?
        .context("Failed to stop runtime")?;
    if report.is_clean() {
        info!(stopped = report.stopped, "hearth stopped");
    } else {
        warn!(
            stopped = report.stopped,
            failures = report.failures.len(),
            "hearth stopped with failing stop hooks"
        );
    }
    Ok(report)
}

/// Resolve the heartbeat, if bound, off the async worker threads
///
/// The first request runs the heartbeat's construction and its unit's activation.
pub async fn resolve_heartbeat(runtime: &Runtime) -> anyhow::Result<Option<Arc<Heartbeat>>> {
    let resolving = runtime.clone();
    let heartbeat = tokio::task::spawn_blocking(move || resolving.try_get::<Heartbeat>()).await??;
    Ok(heartbeat)
}

async fn serve(runtime: &Runtime) -> anyhow::Result<()> {
    let Some(heartbeat) = resolve_heartbeat(runtime).await? else {
        info!("Heartbeat disabled, waiting for Ctrl+C");
        tokio::signal::ctrl_c().await?;
        return Ok(());
    };
    run_heartbeat(heartbeat).await
}

async fn run_heartbeat(heartbeat: Arc<Heartbeat>) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(heartbeat.interval());
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("Received Ctrl+C");
                return Ok(());
            }
            _ = ticker.tick() => {
                let beat = Arc::clone(&heartbeat);
                if let Err(e) = tokio::task::spawn_blocking(move || beat.beat()).await? {
                    warn!(error = %e, "Heartbeat failed");
                }
            }
        }
    }
}

/// Fail when `report` recorded stop hook failures
pub fn ensure_clean(report: &ShutdownReport) -> anyhow::Result<()> {
    if !report.is_clean() {
        bail!("{} stop hooks failed", report.failures.len());
    }
    Ok(())
}
