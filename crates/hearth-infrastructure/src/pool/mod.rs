//! Ordered object pools
//!
//! Pools are bound as named singletons of `OrderedPool<T>`, one per pool name. The
//! capacity and the settings blob can be overridden from `[pools.<name>]`.

pub mod ordered;

pub use ordered::{EntryId, Lease, OrderedPool, OrderedPoolBuilder, PoolEntryInfo};

use crate::config::RuntimeSettings;
use crate::di::{Binding, Registrar, Runtime};
use hearth_domain::error::Result;
use hearth_domain::ports::{EventJournal, PooledObject, ResolveExt};
use std::sync::Arc;

impl Registrar<'_> {
    /// Bind the pool `name` of `T`
    ///
    /// `default_capacity` applies unless `[pools.<name>].capacity` is configured.
    /// `factory` grows the pool on demand; its objects are initialized with the
    /// configured settings blob before first use.
    pub fn pool<T, F>(&self, name: &str, default_capacity: Option<usize>, factory: F) -> Result<()>
    where
        T: PooledObject + 'static,
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        let pool_name = name.to_string();
        let factory = Arc::new(factory);
        self.register(
            Binding::singleton(move |ctx| {
                let settings = ctx.get::<RuntimeSettings>()?;
                let journal = ctx.get::<dyn EventJournal>()?;
                let overrides = settings.pool(&pool_name).cloned().unwrap_or_default();
                let factory = Arc::clone(&factory);
                Ok(Arc::new(
                    OrderedPool::<T>::builder(pool_name.clone())
                        .capacity(overrides.capacity.or(default_capacity))
                        .settings(overrides.settings)
                        .journal(journal)
                        .factory(move || factory())
                        .build(),
                ))
            })
            .named(name),
        )
    }
}

impl Runtime {
    /// The pool `name` of `T`
    pub fn pool<T: PooledObject + 'static>(&self, name: &str) -> Result<Arc<OrderedPool<T>>> {
        self.get_named::<OrderedPool<T>>(name)
    }
}
