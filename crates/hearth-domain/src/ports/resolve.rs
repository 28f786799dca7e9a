//! Contract resolution port
//!
//! [`Resolve`] is object safe so factories, lifecycle callbacks and configuration units can
//! receive a `&dyn Resolve` regardless of whether they run against the runtime itself or
//! against an in-flight resolution context. Typed access lives in [`ResolveExt`].

use crate::error::{Error, Result};
use crate::value_objects::{ContractKey, Instance, downcast_instance};
use std::any::TypeId;
use std::sync::Arc;

/// Resolves contracts into type-erased instances
pub trait Resolve: Send + Sync {
    /// Resolve the binding for `key`
    ///
    /// # Errors
    ///
    /// - `BindingNotFound` when nothing is bound to `key`
    /// - `CircularDependency` when resolving `key` would close a dependency cycle
    /// - `ComponentConstruction` when the singleton behind `key` failed to construct
    fn resolve(&self, key: &ContractKey) -> Result<Instance>;

    /// True when a binding exists for `key`
    fn contains(&self, key: &ContractKey) -> bool;

    /// Every bound contract of the capability type `type_id`, in registration order
    fn contracts_of(&self, type_id: TypeId) -> Vec<ContractKey>;
}

/// Typed helpers over [`Resolve`]
pub trait ResolveExt: Resolve {
    /// Resolve the unnamed contract `I`
    fn get<I: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<I>> {
        self.get_by_key(&ContractKey::of::<I>())
    }

    /// Resolve the contract `I` qualified by `name`
    fn get_named<I: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Result<Arc<I>> {
        self.get_by_key(&ContractKey::named::<I>(name))
    }

    /// Resolve the unnamed contract `I`, or `None` when it is not bound
    fn try_get<I: ?Sized + Send + Sync + 'static>(&self) -> Result<Option<Arc<I>>> {
        let key = ContractKey::of::<I>();
        if !self.contains(&key) {
            return Ok(None);
        }
        self.get_by_key(&key).map(Some)
    }

    /// Resolve every binding of capability `I`, named or not, in registration order
    fn get_all<I: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<I>>> {
        self.contracts_of(TypeId::of::<I>())
            .iter()
            .map(|key| self.get_by_key(key))
            .collect()
    }

    /// Resolve `key` and downcast the instance to `I`
    fn get_by_key<I: ?Sized + Send + Sync + 'static>(&self, key: &ContractKey) -> Result<Arc<I>> {
        let instance = self.resolve(key)?;
        downcast_instance::<I>(&instance).ok_or_else(|| {
            Error::internal(format!(
                "instance bound to {key} is not a {}",
                std::any::type_name::<I>()
            ))
        })
    }
}

impl<R: Resolve + ?Sized> ResolveExt for R {}
