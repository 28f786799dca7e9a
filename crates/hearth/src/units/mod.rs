//! Built-in configuration units
//!
//! Registered at link time through `CONFIGURATION_UNITS`; any of them can be turned off
//! with `runtime.disabled_units`.
//!
//! | Unit | Priority | Provides |
//! |------|----------|----------|
//! | [`system`] | -10 | The `system` module, its permissions and the `StatusProbe` extension point |
//! | [`console`] | 0 | The `console` connector pool and its status probe |
//! | [`heartbeat`] | 10 | A lazily activated heartbeat writing through the console pool |

pub mod console;
pub mod heartbeat;
pub mod system;

pub use console::{CONSOLE_POOL, ConsoleConnector};
pub use heartbeat::Heartbeat;
pub use system::{ProbeReport, SYSTEM_MODULE_ID, StatusProbe, SystemModule, SystemStatus};
