//! Binding registry
//!
//! Holds at most one binding per contract. Writers are serialized by a mutex and
//! publish a new table snapshot through [`ArcSwap`], so lookups never take a lock.
//!
//! Each activation class (eager, lazy) is sealed once by the lifecycle coordinator:
//! the eager class when eager construction begins, the lazy class when the runtime
//! reaches `Started`. A sealed class accepts neither new contracts nor replacements.

use super::binding::Binding;
use arc_swap::ArcSwap;
use dashmap::DashSet;
use hearth_domain::error::{Error, Result};
use hearth_domain::ports::Resolve;
use hearth_domain::{Activation, ContractKey, Lifetime};
use parking_lot::{Mutex, RwLock};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// One-time activation hook of a configuration unit
pub(crate) type ActivationHook = Arc<dyn Fn(&dyn Resolve) -> Result<()> + Send + Sync>;

/// Activation group: the lazy bindings declared by one unit share its hook
#[derive(Clone)]
pub(crate) struct ActivationGroup {
    pub(crate) name: String,
    pub(crate) hook: ActivationHook,
}

#[derive(Clone, Default)]
struct BindingTable {
    entries: HashMap<ContractKey, Arc<Binding>>,
    order: Vec<ContractKey>,
    next_sequence: u64,
}

/// Registry of bindings keyed by contract
pub struct BindingRegistry {
    table: ArcSwap<BindingTable>,
    writer: Mutex<()>,
    eager_sealed: AtomicBool,
    lazy_sealed: AtomicBool,
    constructed: DashSet<ContractKey>,
    groups: RwLock<Vec<ActivationGroup>>,
}

impl BindingRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            table: ArcSwap::from_pointee(BindingTable::default()),
            writer: Mutex::new(()),
            eager_sealed: AtomicBool::new(false),
            lazy_sealed: AtomicBool::new(false),
            constructed: DashSet::new(),
            groups: RwLock::new(Vec::new()),
        }
    }

    /// Register a binding, replacing any previous binding of the same contract
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a transient binding with lifecycle hooks
    /// - `DuplicateBinding` when the existing binding belongs to a sealed class or its
    ///   singleton has begun construction
    /// - `InvalidState` when the binding would enter a sealed class
    pub fn register(&self, binding: impl Into<Binding>) -> Result<()> {
        let mut binding = binding.into();
        if binding.lifetime == Lifetime::Transient && binding.has_hooks() {
            return Err(Error::invalid_argument(format!(
                "transient binding {} cannot declare lifecycle hooks or start listeners",
                binding.key
            )));
        }

        let _guard = self.writer.lock();
        let current = self.table.load();
        let existing = current.entries.get(&binding.key);

        if let Some(existing) = existing {
            if self.is_sealed(existing.activation()) || self.constructed.contains(&binding.key) {
                return Err(Error::duplicate_binding(&binding.key));
            }
        }
        if self.is_sealed(binding.activation()) {
            return Err(Error::invalid_state(format!(
                "cannot register {}: {} bindings are sealed",
                binding.key,
                binding.activation()
            )));
        }

        let mut next = BindingTable::clone(&current);
        if let Some(existing) = existing {
            binding.sequence = existing.sequence;
            debug!(contract = %binding.key, "Replacing binding");
        } else {
            binding.sequence = next.next_sequence;
            next.next_sequence += 1;
            next.order.push(binding.key.clone());
            debug!(
                contract = %binding.key,
                lifetime = %binding.lifetime,
                activation = %binding.activation(),
                "Registering binding"
            );
        }
        next.entries.insert(binding.key.clone(), Arc::new(binding));
        self.table.store(Arc::new(next));
        Ok(())
    }

    /// Binding for `key`, if any
    pub fn lookup(&self, key: &ContractKey) -> Option<Arc<Binding>> {
        self.table.load().entries.get(key).cloned()
    }

    /// True when `key` is bound
    pub fn contains(&self, key: &ContractKey) -> bool {
        self.table.load().entries.contains_key(key)
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.table.load().order.len()
    }

    /// True when no binding is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All bindings in registration order
    pub fn bindings(&self) -> Vec<Arc<Binding>> {
        let table = self.table.load();
        table
            .order
            .iter()
            .filter_map(|key| table.entries.get(key).cloned())
            .collect()
    }

    /// Contracts of capability type `type_id` in registration order
    pub fn contracts_of(&self, type_id: TypeId) -> Vec<ContractKey> {
        self.table
            .load()
            .order
            .iter()
            .filter(|key| key.type_id() == type_id)
            .cloned()
            .collect()
    }

    /// Eager bindings ordered by `(start_order, sequence)`
    pub fn eager_bindings(&self) -> Vec<Arc<Binding>> {
        let mut eager: Vec<_> = self
            .bindings()
            .into_iter()
            .filter(|binding| binding.activation() == Activation::Eager)
            .collect();
        eager.sort_by_key(|binding| (binding.start_order, binding.sequence));
        eager
    }

    /// Seal an activation class
    pub fn seal(&self, activation: Activation) {
        let _guard = self.writer.lock();
        self.flag(activation).store(true, Ordering::Release);
        debug!(activation = %activation, "Binding class sealed");
    }

    /// True when `activation` bindings can no longer change
    pub fn is_sealed(&self, activation: Activation) -> bool {
        self.flag(activation).load(Ordering::Acquire)
    }

    /// Record that the singleton behind `key` began construction and return the
    /// binding it is built from
    ///
    /// Taking the writer lock orders this against a concurrent replacement, so the
    /// returned binding is the one that stays registered.
    pub(crate) fn begin_construction(&self, key: &ContractKey) -> Option<Arc<Binding>> {
        let _guard = self.writer.lock();
        self.constructed.insert(key.clone());
        self.lookup(key)
    }

    pub(crate) fn add_group(&self, name: impl Into<String>, hook: ActivationHook) -> usize {
        let mut groups = self.groups.write();
        groups.push(ActivationGroup {
            name: name.into(),
            hook,
        });
        groups.len() - 1
    }

    pub(crate) fn group(&self, index: usize) -> Option<ActivationGroup> {
        self.groups.read().get(index).cloned()
    }

    fn flag(&self, activation: Activation) -> &AtomicBool {
        match activation {
            Activation::Eager => &self.eager_sealed,
            Activation::Lazy => &self.lazy_sealed,
        }
    }
}

impl Default for BindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
