//! Main application configuration

use super::journal::JournalConfig;
use super::logging::LoggingConfig;
use super::runtime::{PoolConfig, RuntimeConfig};
use super::settings::ComponentSettings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Runtime configuration
    pub runtime: RuntimeConfig,

    /// Journal configuration
    pub journal: JournalConfig,

    /// Pool overrides by pool name
    pub pools: BTreeMap<String, PoolConfig>,

    /// Free-form settings by component name
    pub components: BTreeMap<String, ComponentSettings>,
}
