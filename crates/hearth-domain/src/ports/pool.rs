//! Pooled object port

use crate::error::Result;

/// Object managed by an ordered pool
///
/// The pool calls [`initialize`](PooledObject::initialize) exactly once, before the
/// object is ever handed out. Among free objects the one with the lowest
/// [`order_key`](PooledObject::order_key) is handed out first.
pub trait PooledObject: Send {
    /// One-time initialization from the pool's opaque settings blob
    fn initialize(&mut self, settings: &str) -> Result<()>;

    /// Position of the object among eligible pool entries
    fn order_key(&self) -> i64;
}

impl<T: PooledObject + ?Sized> PooledObject for Box<T> {
    fn initialize(&mut self, settings: &str) -> Result<()> {
        (**self).initialize(settings)
    }

    fn order_key(&self) -> i64 {
        (**self).order_key()
    }
}
