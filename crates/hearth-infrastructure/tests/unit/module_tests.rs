//! Module, permission and extension tests

use hearth_domain::ports::{Component, PermissionAssignments, ResolveExt};
use hearth_domain::{Error, ModulePermissionKey, Principal, Result};
use hearth_infrastructure::di::{Binding, ConfigurationUnit, Registrar, Runtime};
use hearth_infrastructure::journal::{BroadcastJournal, NullJournal};
use hearth_infrastructure::modules::{
    ExtensionAttributes, Module, ModuleCatalog, ModuleCore, ModuleExtension, OwnerSlot,
};
use std::sync::Arc;

struct Billing {
    core: ModuleCore,
}

impl Component for Billing {}

impl Module for Billing {
    fn core(&self) -> &ModuleCore {
        &self.core
    }
}

trait ReportSource: ModuleExtension {
    fn render(&self) -> Result<String>;
}

#[derive(Default)]
struct InvoiceReport {
    owner: OwnerSlot,
}

impl ModuleExtension for InvoiceReport {
    fn owner_slot(&self) -> &OwnerSlot {
        &self.owner
    }
}

impl ReportSource for InvoiceReport {
    fn render(&self) -> Result<String> {
        let owner = self.owner()?;
        Ok(format!("invoices of {}", owner.caption()))
    }
}

struct BillingUnit;

impl ConfigurationUnit for BillingUnit {
    fn name(&self) -> &str {
        "billing"
    }

    fn declare_bindings(&self, registrar: &Registrar<'_>) -> Result<()> {
        registrar
            .module("billing", "Billing", |_, core| Ok(Arc::new(Billing { core })))?
            .permission("billing.view", "View invoices")
            .permission("billing.refund", "Issue refunds")
            .extension::<dyn ReportSource, InvoiceReport, _, _>(
                "invoices",
                ExtensionAttributes::new().with("format", "pdf"),
                |_| Ok(Arc::new(InvoiceReport::default())),
                |report| report as Arc<dyn ReportSource>,
            )?;
        Ok(())
    }
}

struct StaticAssignments;

impl PermissionAssignments for StaticAssignments {
    fn holders_of(&self, key: &ModulePermissionKey) -> Result<Vec<Principal>> {
        if key.permission == "billing.refund" {
            return Ok(vec![Principal::Role("accounting".to_string())]);
        }
        Ok(vec![
            Principal::Role("accounting".to_string()),
            Principal::User("auditor".to_string()),
        ])
    }
}

fn started_runtime(with_assignments: bool) -> Runtime {
    let mut builder = Runtime::builder()
        .with_journal(Arc::new(NullJournal))
        .with_unit(BillingUnit);
    if with_assignments {
        builder = builder.with_binding(Binding::instance::<dyn PermissionAssignments>(
            Arc::new(StaticAssignments),
        ));
    }
    let runtime = builder.build().unwrap();
    runtime.start().unwrap();
    runtime
}

#[test]
fn test_module_is_cataloged_and_resolvable() {
    let runtime = started_runtime(false);
    let catalog = runtime.get::<ModuleCatalog>().unwrap();

    let modules = catalog.modules();
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0].id(), "billing");
    assert_eq!(modules[0].caption(), "Billing");

    let module = catalog.resolve_module(&runtime, "billing").unwrap();
    assert_eq!(module.id(), "billing");
    assert!(module.core().permissions().contains("billing.view"));
    assert_eq!(module.core().permissions().len(), 2);

    // The concrete type and the module capability share one instance
    let concrete = runtime.get_named::<Billing>("billing").unwrap();
    assert!(std::ptr::eq(concrete.core(), module.core()));

    assert!(matches!(
        catalog.resolve_module(&runtime, "shipping"),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn test_permission_registration_is_idempotent() {
    let core = ModuleCore::new("billing", "Billing");
    assert!(core.register_permission("billing.view", "View invoices"));
    assert!(!core.register_permission("billing.view", "Something else"));

    let permission = core.permissions().get("billing.view").unwrap();
    assert_eq!(permission.description, "View invoices");
    assert_eq!(core.permissions().list().len(), 1);
}

#[test]
fn test_extensions_are_attached_to_their_module() {
    let runtime = started_runtime(false);
    let catalog = runtime.catalog();

    let descriptors = catalog.extensions_of::<dyn ReportSource>();
    assert_eq!(descriptors.len(), 1);
    assert_eq!(descriptors[0].module_id, "billing");
    assert_eq!(descriptors[0].name, "invoices");
    assert_eq!(descriptors[0].attributes.get("format"), Some("pdf"));

    let reports = catalog
        .create_extensions::<dyn ReportSource>(&runtime)
        .unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].render().unwrap(), "invoices of Billing");

    // Extensions are transient
    let again = catalog
        .create_extensions::<dyn ReportSource>(&runtime)
        .unwrap();
    assert!(!Arc::ptr_eq(&reports[0], &again[0]));
}

#[test]
fn test_extension_without_owner_is_invalid_state() {
    let report = InvoiceReport::default();
    assert!(!report.owner_slot().is_attached());
    assert!(report.render().unwrap_err().is_invalid_state());
}

#[test]
fn test_extension_owner_attaches_once() {
    let module: Arc<dyn Module> = Arc::new(Billing {
        core: ModuleCore::new("billing", "Billing"),
    });
    let slot = OwnerSlot::new();
    slot.attach(&module).unwrap();
    assert!(slot.attach(&module).unwrap_err().is_invalid_state());
    assert_eq!(slot.owner().unwrap().id(), "billing");

    drop(module);
    assert!(slot.owner().is_err_and(|error| error.is_invalid_state()));
}

#[test]
fn test_permission_holders_are_delegated() {
    let runtime = started_runtime(true);
    let catalog = runtime.catalog();

    let holders = catalog
        .permission_holders(&runtime, &ModulePermissionKey::new("billing", "billing.refund"))
        .unwrap();
    assert_eq!(holders, vec![Principal::Role("accounting".to_string())]);

    let undeclared = catalog
        .permission_holders(&runtime, &ModulePermissionKey::new("billing", "billing.delete"))
        .unwrap_err();
    assert!(matches!(undeclared, Error::NotFound { .. }));

    let unknown_module = catalog
        .permission_holders(&runtime, &ModulePermissionKey::new("shipping", "ship"))
        .unwrap_err();
    assert!(matches!(unknown_module, Error::NotFound { .. }));
}

#[test]
fn test_permission_holders_without_assignments_fail() {
    let runtime = started_runtime(false);
    let error = runtime
        .catalog()
        .permission_holders(&runtime, &ModulePermissionKey::new("billing", "billing.view"))
        .unwrap_err();
    assert!(error.is_binding_not_found());
}

#[test]
fn test_module_construction_is_journaled() {
    let journal = Arc::new(BroadcastJournal::new(16));
    let mut events = journal.subscribe();
    let runtime = Runtime::builder()
        .with_journal(journal)
        .with_unit(BillingUnit)
        .build()
        .unwrap();
    runtime.start().unwrap();

    let first = events.try_recv().unwrap();
    assert_eq!(first.category, "module");
    assert_eq!(first.summary, "Module constructed");
    assert_eq!(first.related.unwrap().id, "billing");
}
