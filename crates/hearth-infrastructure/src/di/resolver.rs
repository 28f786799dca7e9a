//! Resolver
//!
//! Turns contracts into instances. Transients are built on every request.
//! Singletons are built exactly once through their [`ComponentRecord`]; concurrent
//! requests block until the first construction settles and a failed construction is
//! replayed to every later caller.
//!
//! Every construction runs inside a [`ResolutionContext`]: a stack of the records
//! being built on the current path. Requesting something already on the path fails
//! with `CircularDependency` naming the cycle. Cycles spanning threads are caught by
//! the waits-for graph in [`super::record`].
//!
//! Lazy bindings belong to the activation group of the unit that declared them. The
//! first request for any of them runs the unit's one-time activation under its own
//! record, before the binding itself is built.

use super::binding::Binding;
use super::lifecycle::{LateStart, LifecycleCoordinator};
use super::record::{Claim, ComponentRecord, ResolutionKey, WaitGraph};
use super::registry::BindingRegistry;
use dashmap::DashMap;
use hearth_domain::error::{Error, Result};
use hearth_domain::ports::Resolve;
use hearth_domain::{ConstructionState, ContractKey, Instance, Lifetime, RuntimeState};
use std::any::TypeId;
use std::sync::Arc;
use tracing::{debug, trace};

/// Resolver over a binding registry
pub struct Resolver {
    registry: Arc<BindingRegistry>,
    lifecycle: Arc<LifecycleCoordinator>,
    records: DashMap<ResolutionKey, Arc<ComponentRecord>>,
    waits: WaitGraph,
}

impl Resolver {
    /// Create a resolver
    pub fn new(registry: Arc<BindingRegistry>, lifecycle: Arc<LifecycleCoordinator>) -> Self {
        Self {
            registry,
            lifecycle,
            records: DashMap::new(),
            waits: WaitGraph::default(),
        }
    }

    /// Registry the resolver reads from
    pub fn registry(&self) -> &Arc<BindingRegistry> {
        &self.registry
    }

    /// Construction state of the singleton behind `key`; `None` for unknown contracts
    /// and transients
    pub fn construction_state(&self, key: &ContractKey) -> Option<ConstructionState> {
        let binding = self.registry.lookup(key)?;
        if binding.lifetime == Lifetime::Transient {
            return None;
        }
        Some(
            self.records
                .get(&ResolutionKey::Contract(key.clone()))
                .map_or(ConstructionState::Uninitialized, |record| record.state()),
        )
    }

    /// Destroy every record; called once the runtime stopped
    pub(crate) fn clear_records(&self) {
        self.records.clear();
    }

    fn resolve_in(&self, key: &ContractKey, parent: Option<&ResolutionContext<'_>>) -> Result<Instance> {
        if self.lifecycle.state() == RuntimeState::Stopped {
            return Err(Error::invalid_state(format!(
                "cannot resolve {key}: the runtime has stopped"
            )));
        }
        let binding = self
            .registry
            .lookup(key)
            .ok_or_else(|| Error::binding_not_found(key))?;

        let rkey = ResolutionKey::Contract(key.clone());
        if let Some(parent) = parent {
            if let Some(cycle) = parent.cycle_to(&rkey) {
                return Err(Error::circular_dependency(cycle));
            }
        }

        if let Some(group) = binding.group {
            self.ensure_activated(group, parent)?;
        }

        match binding.lifetime {
            Lifetime::Transient => {
                let ctx = ResolutionContext::new(self, rkey, key.to_string(), parent);
                trace!(contract = %key, "Constructing transient");
                let built = (binding.factory)(&ctx)
                    .map_err(|e| Error::construction_failure(key, &Arc::new(e)))?;
                Ok(built.instance)
            }
            Lifetime::Singleton => self.resolve_singleton(key, rkey, parent),
        }
    }

    fn resolve_singleton(
        &self,
        key: &ContractKey,
        rkey: ResolutionKey,
        parent: Option<&ResolutionContext<'_>>,
    ) -> Result<Instance> {
        let record = self.record_for(&rkey, || key.to_string());
        match record.claim(&self.waits)? {
            Claim::Ready(instance) => Ok(instance),
            Claim::Failed(cause) => Err(Error::construction_failure(key, &cause)),
            Claim::Construct(guard) => {
                if self.lifecycle.state().is_shutting_down() {
                    let reason = format!("cannot construct {key}: the runtime is stopping");
                    guard.fail(Arc::new(Error::invalid_state(reason.clone())));
                    return Err(Error::invalid_state(reason));
                }
                let binding = self
                    .registry
                    .begin_construction(key)
                    .ok_or_else(|| Error::binding_not_found(key))?;
                let ctx = ResolutionContext::new(self, rkey, key.to_string(), parent);
                match self.construct_singleton(&binding, &ctx) {
                    Ok((instance, late)) => {
                        guard.complete(Arc::clone(&instance));
                        if let Some(late) = late {
                            let resolver: &dyn Resolve = match parent {
                                Some(parent) => parent,
                                None => self,
                            };
                            self.lifecycle.start_late(late, resolver)?;
                        }
                        Ok(instance)
                    }
                    Err(error) => {
                        let cause = Arc::new(error);
                        guard.fail(Arc::clone(&cause));
                        Err(Error::construction_failure(key, &cause))
                    }
                }
            }
        }
    }

    fn construct_singleton(
        &self,
        binding: &Binding,
        ctx: &ResolutionContext<'_>,
    ) -> Result<(Instance, Option<LateStart>)> {
        debug!(contract = %binding.key, "Constructing singleton");
        let built = (binding.factory)(ctx)?;
        let late = self
            .lifecycle
            .admit(&binding.key, built.lifecycle, built.listener)?;
        Ok((built.instance, late))
    }

    fn ensure_activated(&self, group: usize, parent: Option<&ResolutionContext<'_>>) -> Result<()> {
        let gkey = ResolutionKey::Activation(group);
        if parent.is_some_and(|p| p.contains(&gkey)) {
            return Ok(());
        }
        let Some(activation) = self.registry.group(group) else {
            return Err(Error::internal(format!("unknown activation group #{group}")));
        };
        let label = format!("activation of {}", activation.name);
        let record = self.record_for(&gkey, || label.clone());
        match record.claim(&self.waits)? {
            Claim::Ready(_) => Ok(()),
            Claim::Failed(cause) => Err(Error::construction_failure(&label, &cause)),
            Claim::Construct(guard) => {
                debug!(unit = %activation.name, "Running first activation");
                let ctx = ResolutionContext::new(self, gkey, label.clone(), parent);
                match (activation.hook)(&ctx) {
                    Ok(()) => {
                        guard.complete(Arc::new(()));
                        Ok(())
                    }
                    Err(error) => {
                        let cause = Arc::new(error);
                        guard.fail(Arc::clone(&cause));
                        Err(Error::construction_failure(&label, &cause))
                    }
                }
            }
        }
    }

    fn record_for(&self, key: &ResolutionKey, label: impl FnOnce() -> String) -> Arc<ComponentRecord> {
        if let Some(record) = self.records.get(key) {
            return Arc::clone(record.value());
        }
        let record = self
            .records
            .entry(key.clone())
            .or_insert_with(|| Arc::new(ComponentRecord::new(key.clone(), label())));
        Arc::clone(record.value())
    }
}

impl Resolve for Resolver {
    fn resolve(&self, key: &ContractKey) -> Result<Instance> {
        self.resolve_in(key, None)
    }

    fn contains(&self, key: &ContractKey) -> bool {
        self.registry.contains(key)
    }

    fn contracts_of(&self, type_id: TypeId) -> Vec<ContractKey> {
        self.registry.contracts_of(type_id)
    }
}

/// Resolution in progress
///
/// Handed to factories and activation hooks. Resolving through the context keeps the
/// path of records under construction, which is how cycles are detected.
pub struct ResolutionContext<'a> {
    resolver: &'a Resolver,
    key: ResolutionKey,
    label: String,
    parent: Option<&'a ResolutionContext<'a>>,
}

impl<'a> ResolutionContext<'a> {
    fn new(
        resolver: &'a Resolver,
        key: ResolutionKey,
        label: String,
        parent: Option<&'a ResolutionContext<'a>>,
    ) -> Self {
        Self {
            resolver,
            key,
            label,
            parent,
        }
    }

    /// Labels of the path from the outermost resolution to this one
    pub fn path(&self) -> Vec<String> {
        let mut path: Vec<String> = self.ancestors().map(|ctx| ctx.label.clone()).collect();
        path.reverse();
        path
    }

    /// Depth of this resolution; the outermost request has depth 1
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    fn ancestors(&self) -> impl Iterator<Item = &ResolutionContext<'a>> {
        std::iter::successors(Some(self), |ctx| ctx.parent)
    }

    fn contains(&self, key: &ResolutionKey) -> bool {
        self.ancestors().any(|ctx| ctx.key == *key)
    }

    /// Cycle closed by requesting `key` again, outermost occurrence first
    fn cycle_to(&self, key: &ResolutionKey) -> Option<Vec<String>> {
        let mut cycle = Vec::new();
        for ctx in self.ancestors() {
            cycle.push(ctx.label.clone());
            if ctx.key == *key {
                cycle.reverse();
                cycle.push(cycle[0].clone());
                return Some(cycle);
            }
        }
        None
    }
}

impl Resolve for ResolutionContext<'_> {
    fn resolve(&self, key: &ContractKey) -> Result<Instance> {
        self.resolver.resolve_in(key, Some(self))
    }

    fn contains(&self, key: &ContractKey) -> bool {
        self.resolver.registry.contains(key)
    }

    fn contracts_of(&self, type_id: TypeId) -> Vec<ContractKey> {
        self.resolver.registry.contracts_of(type_id)
    }
}
