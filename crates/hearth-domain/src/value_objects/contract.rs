//! Contract keys and type-erased instances
//!
//! A contract is the capability a component provides. Resolution is always keyed by
//! contract: usually a trait object type such as `dyn Clock`, optionally qualified by a
//! name so that several bindings of the same capability can coexist.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Type-erased component instance
///
/// The runtime stores every instance as an `Arc<I>` boxed behind `Any`, where `I` is the
/// contract type. Use [`downcast_instance`] to get the typed handle back.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Wrap a typed handle into a type-erased [`Instance`]
pub fn erase_instance<I: ?Sized + Send + Sync + 'static>(instance: Arc<I>) -> Instance {
    Arc::new(instance)
}

/// Recover the typed handle stored in an [`Instance`]
///
/// Returns `None` when the instance was not created for contract type `I`.
pub fn downcast_instance<I: ?Sized + Send + Sync + 'static>(instance: &Instance) -> Option<Arc<I>> {
    instance.downcast_ref::<Arc<I>>().cloned()
}

/// Key identifying a contract
#[derive(Clone)]
pub struct ContractKey {
    type_id: TypeId,
    type_name: &'static str,
    name: Option<Arc<str>>,
}

impl ContractKey {
    /// Key for the unnamed contract of type `I`
    pub fn of<I: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<I>(),
            type_name: std::any::type_name::<I>(),
            name: None,
        }
    }

    /// Key for the contract of type `I` qualified by `name`
    pub fn named<I: ?Sized + 'static>(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::of::<I>()
        }
    }

    /// Type identifier of the capability type
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Readable name of the capability type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Qualifying name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// True when this key belongs to capability type `I` (named or not)
    pub fn is_contract_of<I: ?Sized + 'static>(&self) -> bool {
        self.type_id == TypeId::of::<I>()
    }
}

impl PartialEq for ContractKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl Eq for ContractKey {}

impl Hash for ContractKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for ContractKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}#{}", self.type_name, name),
            None => f.write_str(self.type_name),
        }
    }
}

impl fmt::Debug for ContractKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContractKey({self})")
    }
}
