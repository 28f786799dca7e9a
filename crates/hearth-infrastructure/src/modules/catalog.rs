//! Module catalog and module registration
//!
//! The catalog records every module and extension declared at bind time. It is bound
//! as a runtime singleton so that components can enumerate modules, resolve them by
//! id and instantiate every extension of an extension point.

use super::extension::{ExtensionAttributes, ExtensionDescriptor, ModuleExtension};
use super::module::{Module, ModuleCore};
use crate::di::{Binding, Registrar, ResolutionContext};
use hearth_domain::constants::{JOURNAL_CATEGORY_MODULE, RELATED_KIND_MODULE};
use hearth_domain::error::{Error, Result};
use hearth_domain::events::OperationalEvent;
use hearth_domain::ports::{Component, PermissionAssignments, Resolve, ResolveExt};
use hearth_domain::{ContractKey, ModulePermissionKey, Principal};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Registry of declared modules
#[derive(Debug, Default)]
pub struct ModuleCatalog {
    modules: RwLock<Vec<ModuleCore>>,
}

impl ModuleCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a module, replacing an earlier declaration with the same id
    pub(crate) fn declare(&self, core: ModuleCore) {
        let mut modules = self.modules.write();
        if let Some(existing) = modules.iter_mut().find(|m| m.id() == core.id()) {
            *existing = core;
        } else {
            modules.push(core);
        }
    }

    /// Every declared module in declaration order
    pub fn modules(&self) -> Vec<ModuleCore> {
        self.modules.read().clone()
    }

    /// Module declared under `id`
    pub fn module(&self, id: &str) -> Option<ModuleCore> {
        self.modules.read().iter().find(|m| m.id() == id).cloned()
    }

    /// Resolve the module instance declared under `id`
    ///
    /// # Errors
    ///
    /// `NotFound` when no module is declared under `id`; any construction error of the
    /// module.
    pub fn resolve_module(&self, resolver: &dyn Resolve, id: &str) -> Result<Arc<dyn Module>> {
        if self.module(id).is_none() {
            return Err(Error::not_found(format!("module '{id}'")));
        }
        resolver.get_named::<dyn Module>(id)
    }

    /// Extensions bound to extension point `P`, in module then declaration order
    pub fn extensions_of<P: ?Sized + 'static>(&self) -> Vec<ExtensionDescriptor> {
        self.modules
            .read()
            .iter()
            .flat_map(ModuleCore::extensions)
            .filter(|descriptor| descriptor.contract.is_contract_of::<P>())
            .collect()
    }

    /// Instantiate every extension of extension point `P`
    pub fn create_extensions<P>(&self, resolver: &dyn Resolve) -> Result<Vec<Arc<P>>>
    where
        P: ?Sized + Send + Sync + 'static,
    {
        self.extensions_of::<P>()
            .iter()
            .map(|descriptor| resolver.get_by_key::<P>(&descriptor.contract))
            .collect()
    }

    /// Roles and users holding `key`
    ///
    /// The owning module is constructed first; the lookup itself is delegated to the
    /// bound `PermissionAssignments`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the module or the permission is not declared;
    /// `BindingNotFound` when no `PermissionAssignments` is bound.
    pub fn permission_holders(
        &self,
        resolver: &dyn Resolve,
        key: &ModulePermissionKey,
    ) -> Result<Vec<Principal>> {
        let core = self
            .module(&key.module_id)
            .ok_or_else(|| Error::not_found(format!("module '{}'", key.module_id)))?;
        if !core.permissions().contains(&key.permission) {
            return Err(Error::not_found(format!("permission {key}")));
        }
        self.resolve_module(resolver, &key.module_id)?;
        resolver
            .get::<dyn PermissionAssignments>()?
            .holders_of(key)
    }
}

/// Declarations of one module, returned by [`Registrar::module`]
pub struct ModuleBinder<'r> {
    registrar: &'r Registrar<'r>,
    core: ModuleCore,
}

impl ModuleBinder<'_> {
    /// Core of the module being declared
    pub fn core(&self) -> &ModuleCore {
        &self.core
    }

    /// Declare a permission; idempotent by key
    pub fn permission(&self, key: &str, description: &str) -> &Self {
        self.core.register_permission(key, description);
        self
    }

    /// Declare extension `name` for extension point `P`
    ///
    /// The extension is bound as a transient under a contract named
    /// `<module id>.<name>`. Every constructed instance is attached to this module
    /// before it is returned. `cast` turns the concrete extension into the extension
    /// point, usually `|e| e`.
    pub fn extension<P, E, F, C>(
        &self,
        name: &str,
        attributes: ExtensionAttributes,
        factory: F,
        cast: C,
    ) -> Result<&Self>
    where
        P: ?Sized + Send + Sync + 'static,
        E: ModuleExtension + 'static,
        F: Fn(&ResolutionContext<'_>) -> Result<Arc<E>> + Send + Sync + 'static,
        C: Fn(Arc<E>) -> Arc<P> + Send + Sync + 'static,
    {
        let contract_name = format!("{}.{name}", self.core.id());
        let module_id = self.core.id().to_string();
        let builder = Binding::transient(move |ctx| {
            let extension = factory(ctx)?;
            let owner = ctx.get_named::<dyn Module>(&module_id)?;
            extension.owner_slot().attach(&owner)?;
            Ok(cast(extension))
        })
        .named(contract_name.as_str());

        let contract = ContractKey::named::<P>(contract_name.as_str());
        self.registrar.register(builder)?;
        self.core.add_extension(ExtensionDescriptor {
            module_id: self.core.id().to_string(),
            name: name.to_string(),
            contract,
            attributes,
        });
        debug!(module = self.core.id(), extension = name, "Extension declared");
        Ok(self)
    }
}

impl Registrar<'_> {
    /// Declare module `id`
    ///
    /// Binds the module as a singleton under its concrete type named `id`, with its
    /// lifecycle hooks, and as `dyn Module` named `id`. `factory` receives the module's
    /// [`ModuleCore`]; permissions and extensions declared through the returned binder
    /// are visible through that core.
    pub fn module<M, F>(&self, id: &str, caption: &str, factory: F) -> Result<ModuleBinder<'_>>
    where
        M: Module + 'static,
        F: Fn(&ResolutionContext<'_>, ModuleCore) -> Result<Arc<M>> + Send + Sync + 'static,
    {
        let core = ModuleCore::new(id, caption);

        let module_core = core.clone();
        let journal = Arc::clone(self.journal());
        self.register(
            Binding::singleton(move |ctx| {
                let module = factory(ctx, module_core.clone())?;
                info!(module = module_core.id(), "Module constructed");
                journal.record(
                    OperationalEvent::info(JOURNAL_CATEGORY_MODULE, "Module constructed")
                        .with_related(RELATED_KIND_MODULE, module_core.id()),
                );
                Ok(module)
            })
            .named(id)
            .with_lifecycle(|module| module as Arc<dyn Component>),
        )?;

        let concrete = id.to_string();
        self.register(
            Binding::singleton(move |ctx| {
                let module: Arc<dyn Module> = ctx.get_named::<M>(&concrete)?;
                Ok(module)
            })
            .named(id),
        )?;

        self.catalog().declare(core.clone());
        debug!(module = id, "Module declared");
        Ok(ModuleBinder {
            registrar: self,
            core,
        })
    }
}
