//! Value objects

pub mod contract;
pub mod lifecycle;
pub mod permission;

pub use contract::{ContractKey, Instance, downcast_instance, erase_instance};
pub use lifecycle::{Activation, ConstructionState, Lifetime, RuntimeState};
pub use permission::{ModulePermissionKey, Permission, Principal};
