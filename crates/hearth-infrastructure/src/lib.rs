//! # Infrastructure Layer
//!
//! The Hearth runtime: binding registry, resolver, lifecycle coordination, object
//! pools, modules and the ambient services they rely on.
//!
//! ## Module Categories
//!
//! ### Dependency Resolution & Lifecycle
//! | Module | Description |
//! |--------|-------------|
//! | [`di`] | Bindings, resolver, lifecycle coordinator, configuration units, runtime |
//! | [`pool`] | Ordered object pools with on-demand growth |
//! | [`modules`] | Modules, permissions and extensions |
//!
//! ### Configuration
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment-layered TOML and environment configuration |
//! | [`constants`] | Centralized configuration constants |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`journal`] | Operational event journal backends |
//! | [`logging`] | Structured logging with tracing |

pub mod config;
pub mod constants;
pub mod di;
pub mod error_ext;
pub mod journal;
pub mod logging;
pub mod modules;
pub mod pool;

// Re-export commonly used types
pub use di::{Binding, ConfigurationUnit, Registrar, Runtime, RuntimeBuilder};
pub use error_ext::ErrorContext;
