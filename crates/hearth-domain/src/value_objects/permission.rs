//! Module permission value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission declared by a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Key, unique within the owning module
    pub key: String,
    /// Human-readable description
    pub description: String,
}

impl Permission {
    /// Create a permission
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
        }
    }
}

/// Fully qualified permission key: owning module plus permission key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModulePermissionKey {
    /// Owning module id
    pub module_id: String,
    /// Permission key within the module
    pub permission: String,
}

impl ModulePermissionKey {
    /// Create a qualified permission key
    pub fn new(module_id: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            permission: permission.into(),
        }
    }
}

impl fmt::Display for ModulePermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module_id, self.permission)
    }
}

/// Holder of a permission, as reported by the permission subsystem
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Principal {
    /// A role
    Role(String),
    /// A single user
    User(String),
}
