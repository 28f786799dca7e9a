//! # Domain Layer
//!
//! Core types and contracts of the Hearth component hosting runtime.
//!
//! This crate has no knowledge of how components are constructed or scheduled.
//! It defines the vocabulary shared by the runtime and by every hosted component:
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Domain error type and `Result` alias |
//! | [`value_objects`] | Contract keys, lifetimes, activation modes, runtime states, permissions |
//! | [`events`] | Operational events emitted to the journal |
//! | [`ports`] | Traits implemented by hosted components and external collaborators |
//! | [`constants`] | Journal categories and other shared constants |

pub mod constants;
pub mod error;
pub mod events;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
pub use events::{EventSeverity, OperationalEvent, RelatedObject};
pub use value_objects::{
    Activation, ConstructionState, ContractKey, Instance, Lifetime, ModulePermissionKey,
    Permission, Principal, RuntimeState, downcast_instance,
};
