//! Read-only settings view handed to configuration units and components

use super::app::AppConfig;
use super::runtime::PoolConfig;
use hearth_domain::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Typed lookup over one component's `[components.<name>]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentSettings(BTreeMap<String, serde_json::Value>);

impl ComponentSettings {
    /// Create settings from key/value pairs
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, serde_json::Value)>,
        K: Into<String>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Look up `key` and deserialize it as `T`
    ///
    /// Returns `Ok(None)` when the key is absent and a configuration error when the
    /// value does not have the requested type.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(value) = self.0.get(key) else {
            return Ok(None);
        };
        serde_json::from_value(value.clone()).map(Some).map_err(|e| {
            Error::configuration_with_source(format!("Invalid value for setting '{key}'"), e)
        })
    }

    /// Look up `key`, falling back to `default` when it is absent
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    /// True when `key` is present
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Set a value
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.0.insert(key.into(), value);
    }

    /// True when no setting is present
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Shared read-only view of the loaded [`AppConfig`]
#[derive(Debug, Clone, Default)]
pub struct RuntimeSettings {
    config: Arc<AppConfig>,
}

impl RuntimeSettings {
    /// Wrap a loaded configuration
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// The full configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Settings of component `name`, empty when the table is absent
    pub fn component(&self, name: &str) -> ComponentSettings {
        self.config
            .components
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Overrides of pool `name`
    pub fn pool(&self, name: &str) -> Option<&PoolConfig> {
        self.config.pools.get(name)
    }

    /// True when unit `name` is listed in `runtime.disabled_units`
    pub fn is_unit_disabled(&self, name: &str) -> bool {
        self.config
            .runtime
            .disabled_units
            .iter()
            .any(|disabled| disabled == name)
    }
}
