//! Module extensions
//!
//! Extensions are transient components owned by a module. The runtime attaches the
//! owner right after constructing an extension, before handing it out; an extension
//! checks its [`OwnerSlot`] before doing any work.

use super::module::Module;
use hearth_domain::ContractKey;
use hearth_domain::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

/// Back-reference from an extension to its owning module
///
/// Holds a weak reference: the module owns its extensions, never the reverse.
#[derive(Default)]
pub struct OwnerSlot {
    owner: OnceLock<Weak<dyn Module>>,
}

impl OwnerSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the owning module
    ///
    /// # Errors
    ///
    /// `InvalidState` when an owner is already attached.
    pub fn attach(&self, owner: &Arc<dyn Module>) -> Result<()> {
        self.owner
            .set(Arc::downgrade(owner))
            .map_err(|_| Error::invalid_state("extension is already attached to a module"))
    }

    /// The owning module
    ///
    /// # Errors
    ///
    /// `InvalidState` when no owner was attached or the owner has been dropped.
    pub fn owner(&self) -> Result<Arc<dyn Module>> {
        let weak = self
            .owner
            .get()
            .ok_or_else(|| Error::invalid_state("extension used before it was attached to a module"))?;
        weak.upgrade()
            .ok_or_else(|| Error::invalid_state("owning module of the extension has been dropped"))
    }

    /// True once an owner is attached
    pub fn is_attached(&self) -> bool {
        self.owner.get().is_some()
    }
}

impl fmt::Debug for OwnerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnerSlot")
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Capability of every module extension
pub trait ModuleExtension: Send + Sync {
    /// Slot holding the owning module
    fn owner_slot(&self) -> &OwnerSlot;

    /// The owning module; fails with `InvalidState` before attachment
    fn owner(&self) -> Result<Arc<dyn Module>> {
        self.owner_slot().owner()
    }
}

/// Attributes declared for an extension at bind time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionAttributes(BTreeMap<String, String>);

impl ExtensionAttributes {
    /// Create an empty attribute map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Attribute value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Attributes in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True when no attribute is declared
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Extension declared by a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionDescriptor {
    /// Owning module id
    pub module_id: String,
    /// Extension name, unique within the module
    pub name: String,
    /// Named contract the extension is bound to
    pub contract: ContractKey,
    /// Declared attributes
    pub attributes: ExtensionAttributes,
}
