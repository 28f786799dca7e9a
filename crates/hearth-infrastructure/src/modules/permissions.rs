//! Module permission sets

use hearth_domain::Permission;
use parking_lot::RwLock;
use std::sync::Arc;

/// Append-only set of permissions declared by one module
///
/// Clones share the same set. Registering a key that is already present keeps the
/// first declaration.
#[derive(Debug, Clone, Default)]
pub struct PermissionSet {
    permissions: Arc<RwLock<Vec<Permission>>>,
}

impl PermissionSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a permission; returns `false` when the key was already declared
    pub fn register(&self, key: impl Into<String>, description: impl Into<String>) -> bool {
        let key = key.into();
        let mut permissions = self.permissions.write();
        if permissions.iter().any(|p| p.key == key) {
            return false;
        }
        permissions.push(Permission::new(key, description));
        true
    }

    /// True when `key` is declared
    pub fn contains(&self, key: &str) -> bool {
        self.permissions.read().iter().any(|p| p.key == key)
    }

    /// Permission declared under `key`
    pub fn get(&self, key: &str) -> Option<Permission> {
        self.permissions.read().iter().find(|p| p.key == key).cloned()
    }

    /// Every permission in declaration order
    pub fn list(&self) -> Vec<Permission> {
        self.permissions.read().clone()
    }

    /// Number of declared permissions
    pub fn len(&self) -> usize {
        self.permissions.read().len()
    }

    /// True when no permission is declared
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
