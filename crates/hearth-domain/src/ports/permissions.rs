//! Permission assignment port

use crate::error::Result;
use crate::value_objects::{ModulePermissionKey, Principal};

/// Looks up who holds a module permission
///
/// Implemented by the permission-management subsystem, hosted as a regular component.
pub trait PermissionAssignments: Send + Sync {
    /// Roles and users that hold `key`
    fn holders_of(&self, key: &ModulePermissionKey) -> Result<Vec<Principal>>;
}
