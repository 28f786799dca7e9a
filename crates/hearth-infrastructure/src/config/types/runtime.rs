//! Runtime and pool configuration types

use serde::{Deserialize, Serialize};

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Names of link-time registered configuration units to skip
    pub disabled_units: Vec<String>,

    /// Run stop hooks of the already constructed components when startup fails
    pub stop_on_failed_start: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            disabled_units: Vec::new(),
            stop_on_failed_start: true,
        }
    }
}

/// Per-pool overrides, keyed by pool name under `[pools.<name>]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of entries; unbounded when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,

    /// Settings blob passed to every entry's one-time initialization
    pub settings: String,
}
