//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.
//! Domain-specific constants are defined in `hearth_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "hearth.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "hearth";

/// Environment variable prefix for configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "HEARTH";

/// Separator between nested keys in environment variable names
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable that overrides the configured log filter
pub const LOG_ENV_VAR: &str = "HEARTH_LOG";

/// File stem used for rolling log files when the configured path has none
pub const DEFAULT_LOG_FILE_STEM: &str = "hearth";

// ============================================================================
// JOURNAL CONSTANTS
// ============================================================================

/// Default capacity of the broadcast journal channel
pub const DEFAULT_JOURNAL_CAPACITY: usize = 1024;

// Re-export domain constants for convenience
pub use hearth_domain::constants::*;
