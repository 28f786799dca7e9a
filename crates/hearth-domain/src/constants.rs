//! Domain layer constants
//!
//! Values shared by the runtime and by hosted components. Infrastructure-specific
//! constants (file names, environment variables) live in `hearth-infrastructure`.

// ============================================================================
// JOURNAL CATEGORIES
// ============================================================================

/// Category for runtime start/stop events
pub const JOURNAL_CATEGORY_LIFECYCLE: &str = "lifecycle";

/// Category for pool entry creation and discard events
pub const JOURNAL_CATEGORY_POOL: &str = "pool";

/// Category for module construction and extension events
pub const JOURNAL_CATEGORY_MODULE: &str = "module";

// ============================================================================
// RELATED OBJECT KINDS
// ============================================================================

/// Related object kind for a bound contract
pub const RELATED_KIND_CONTRACT: &str = "contract";

/// Related object kind for a pool
pub const RELATED_KIND_POOL: &str = "pool";

/// Related object kind for a module
pub const RELATED_KIND_MODULE: &str = "module";

// ============================================================================
// BINDING DEFAULTS
// ============================================================================

/// Start order used when a binding does not declare one
pub const DEFAULT_START_ORDER: i32 = 0;
