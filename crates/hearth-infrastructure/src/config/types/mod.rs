//! Configuration types module

pub mod app;
pub mod journal;
pub mod logging;
pub mod runtime;
pub mod settings;

pub use app::AppConfig;
pub use journal::{JournalBackend, JournalConfig};
pub use logging::LoggingConfig;
pub use runtime::{PoolConfig, RuntimeConfig};
pub use settings::{ComponentSettings, RuntimeSettings};
