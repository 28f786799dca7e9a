//! Modules and extensions
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`module`] | `Module` capability and the `ModuleCore` handed to module factories |
//! | [`extension`] | Extensions, their owner back-reference and declared attributes |
//! | [`permissions`] | Append-only permission sets |
//! | [`catalog`] | Catalog of declared modules and the registration surface |

pub mod catalog;
pub mod extension;
pub mod module;
pub mod permissions;

pub use catalog::{ModuleBinder, ModuleCatalog};
pub use extension::{ExtensionAttributes, ExtensionDescriptor, ModuleExtension, OwnerSlot};
pub use module::{Module, ModuleCore};
pub use permissions::PermissionSet;
