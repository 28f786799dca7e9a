//! Configuration
//!
//! Layered configuration (defaults, TOML file, `HEARTH__` environment variables)
//! loaded with figment, plus the read-only [`RuntimeSettings`] view handed to
//! configuration units and components.

pub mod loader;
pub mod types;

pub use loader::{ConfigBuilder, ConfigLoader};
pub use types::{
    AppConfig, ComponentSettings, JournalBackend, JournalConfig, LoggingConfig, PoolConfig,
    RuntimeConfig, RuntimeSettings,
};
