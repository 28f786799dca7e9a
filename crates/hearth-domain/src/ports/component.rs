//! Component lifecycle port

use super::resolve::Resolve;
use crate::error::Result;

/// Lifecycle hooks of a hosted singleton
///
/// Eager singletons receive `on_starting` right after construction and `on_started`
/// once every eager singleton exists. Singletons constructed after startup receive both
/// hooks inline during their construction. `on_stop` runs in exact reverse
/// construction order while the runtime stops; a failing stop hook is logged and
/// does not prevent the remaining hooks from running.
pub trait Component: Send + Sync {
    /// Called right after construction
    fn on_starting(&self) -> Result<()> {
        Ok(())
    }

    /// Called once the startup batch that contains this component is complete
    fn on_started(&self) -> Result<()> {
        Ok(())
    }

    /// Called while the runtime stops
    fn on_stop(&self) -> Result<()> {
        Ok(())
    }
}

/// Notified once the runtime finished starting
pub trait StartListener: Send + Sync {
    /// Called after every eager component started and every configuration unit ran its
    /// post-binding step
    fn on_startup_complete(&self, resolver: &dyn Resolve) -> Result<()>;
}
