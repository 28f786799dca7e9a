//! Modules
//!
//! A module is a singleton component that owns a permission set and a list of
//! extensions. Its identity and declarations live in a [`ModuleCore`] that the runtime
//! builds at bind time and hands to the module's factory.

use super::extension::ExtensionDescriptor;
use super::permissions::PermissionSet;
use hearth_domain::ports::Component;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Identity and declarations of a module
///
/// Clones share the permission set and the extension list.
#[derive(Clone)]
pub struct ModuleCore {
    id: Arc<str>,
    caption: Arc<str>,
    permissions: PermissionSet,
    extensions: Arc<RwLock<Vec<ExtensionDescriptor>>>,
}

impl ModuleCore {
    /// Create the core of module `id`
    pub fn new(id: impl Into<Arc<str>>, caption: impl Into<Arc<str>>) -> Self {
        Self {
            id: id.into(),
            caption: caption.into(),
            permissions: PermissionSet::new(),
            extensions: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Module id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable caption
    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Permission set
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Declare a permission; idempotent by key
    pub fn register_permission(
        &self,
        key: impl Into<String>,
        description: impl Into<String>,
    ) -> bool {
        self.permissions.register(key, description)
    }

    /// Extensions declared for this module, in declaration order
    pub fn extensions(&self) -> Vec<ExtensionDescriptor> {
        self.extensions.read().clone()
    }

    pub(crate) fn add_extension(&self, descriptor: ExtensionDescriptor) {
        let mut extensions = self.extensions.write();
        extensions.retain(|existing| existing.contract != descriptor.contract);
        extensions.push(descriptor);
    }
}

impl fmt::Debug for ModuleCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleCore")
            .field("id", &self.id)
            .field("caption", &self.caption)
            .field("permissions", &self.permissions.len())
            .field("extensions", &self.extensions.read().len())
            .finish()
    }
}

/// Capability of every module
pub trait Module: Component {
    /// The core handed to the module's factory
    fn core(&self) -> &ModuleCore;

    /// Module id
    fn id(&self) -> &str {
        self.core().id()
    }

    /// Human-readable caption
    fn caption(&self) -> &str {
        self.core().caption()
    }

    /// Declare a permission; idempotent by key
    fn register_permission(&self, key: &str, description: &str) -> bool {
        self.core().register_permission(key, description)
    }
}
