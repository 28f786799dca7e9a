//! Runtime startup tests

use hearth_domain::ports::{Component, EventJournal, Resolve, ResolveExt};
use hearth_domain::{ConstructionState, Error, Result, RuntimeState};
use hearth_infrastructure::config::{ConfigBuilder, RuntimeSettings};
use hearth_infrastructure::di::{
    Binding, CONFIGURATION_UNITS, ConfigurationUnit, Registrar, Runtime, UnitEntry, list_units,
};
use hearth_infrastructure::journal::{BroadcastJournal, NullJournal};
use hearth_infrastructure::modules::ModuleCatalog;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
struct Marker;

struct MarkerUnit;

impl ConfigurationUnit for MarkerUnit {
    fn name(&self) -> &str {
        "test-marker"
    }

    fn declare_bindings(&self, registrar: &Registrar<'_>) -> Result<()> {
        registrar.register(Binding::instance(Arc::new(Marker)))
    }
}

fn marker_unit() -> Arc<dyn ConfigurationUnit> {
    Arc::new(MarkerUnit)
}

#[linkme::distributed_slice(CONFIGURATION_UNITS)]
static MARKER_UNIT: UnitEntry = UnitEntry {
    name: "test-marker",
    description: "Binds the test marker",
    priority: 0,
    factory: marker_unit,
};

struct Steady;

impl Component for Steady {}

#[test]
fn test_first_eager_failure_aborts_startup() {
    let built_after = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&built_after);
    let runtime = Runtime::builder()
        .with_journal(Arc::new(NullJournal))
        .build()
        .unwrap();

    runtime
        .register(
            Binding::singleton(|_| Ok(Arc::new(Steady)))
                .start_order(0)
                .with_lifecycle(|steady| steady as Arc<dyn Component>),
        )
        .unwrap();
    runtime
        .register(
            Binding::singleton(|_| -> Result<Arc<String>> {
                Err(Error::component("broken on purpose"))
            })
            .start_order(1),
        )
        .unwrap();
    runtime
        .register(
            Binding::singleton(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(7u32))
            })
            .start_order(2),
        )
        .unwrap();

    let error = runtime.start().unwrap_err();
    assert!(matches!(error, Error::ComponentConstruction { .. }));
    assert_eq!(runtime.state(), RuntimeState::Failed);
    assert_eq!(built_after.load(Ordering::SeqCst), 0);

    let report = runtime.stop().unwrap();
    assert_eq!(report.stopped, 1);
    assert_eq!(runtime.state(), RuntimeState::Stopped);
}

#[test]
fn test_ambient_services_are_bound() {
    let runtime = Runtime::builder()
        .with_journal(Arc::new(NullJournal))
        .build()
        .unwrap();
    runtime.start().unwrap();

    assert!(runtime.get::<dyn EventJournal>().is_ok());
    assert!(runtime.get::<ModuleCatalog>().is_ok());
    let settings = runtime.get::<RuntimeSettings>().unwrap();
    assert!(settings.config().runtime.stop_on_failed_start);
    assert!(
        runtime
            .components()
            .iter()
            .all(|info| info.state == Some(ConstructionState::Ready))
    );
}

#[test]
fn test_link_time_units_are_collected() {
    assert!(list_units().contains(&("test-marker", "Binds the test marker")));

    let runtime = Runtime::builder()
        .with_journal(Arc::new(NullJournal))
        .with_registered_units()
        .build()
        .unwrap();
    assert!(runtime.unit_names().contains(&"test-marker".to_string()));

    runtime.start().unwrap();
    assert!(runtime.get::<Marker>().is_ok());
}

#[test]
fn test_disabled_units_are_skipped() {
    let config = ConfigBuilder::new()
        .with_disabled_unit("test-marker")
        .build();
    let runtime = Runtime::builder()
        .with_config(config)
        .with_journal(Arc::new(NullJournal))
        .with_registered_units()
        .build()
        .unwrap();
    assert!(!runtime.unit_names().contains(&"test-marker".to_string()));

    runtime.start().unwrap();
    assert!(runtime.get::<Marker>().unwrap_err().is_binding_not_found());
}

#[test]
fn test_invalid_configuration_is_rejected_at_build() {
    let mut config = ConfigBuilder::new().build();
    config.logging.level = "loud".to_string();

    let result = Runtime::builder().with_config(config).build();
    assert!(matches!(result, Err(Error::Configuration { .. })));
}

#[test]
fn test_startup_is_journaled() {
    let journal = Arc::new(BroadcastJournal::new(16));
    let mut events = journal.subscribe();
    let runtime = Runtime::builder()
        .with_journal(journal)
        .build()
        .unwrap();

    runtime.start().unwrap();
    runtime.stop().unwrap();

    let started = events.try_recv().unwrap();
    assert_eq!(started.summary, "Runtime started");
    let stopped = events.try_recv().unwrap();
    assert_eq!(stopped.summary, "Runtime stopped");
}

#[test]
fn test_units_declare_in_order_and_see_each_other() {
    struct Provider;
    struct Consumer;

    impl ConfigurationUnit for Provider {
        fn name(&self) -> &str {
            "provider"
        }

        fn declare_bindings(&self, registrar: &Registrar<'_>) -> Result<()> {
            registrar.register(Binding::instance(Arc::new(40u64)))
        }
    }

    impl ConfigurationUnit for Consumer {
        fn name(&self) -> &str {
            "consumer"
        }

        fn declare_bindings(&self, registrar: &Registrar<'_>) -> Result<()> {
            registrar.register(Binding::singleton(|ctx| {
                let base = ctx.get::<u64>()?;
                Ok(Arc::new((*base + 2).to_string()))
            }))
        }

        fn after_bindings_ready(&self, resolver: &dyn Resolve) -> Result<()> {
            assert_eq!(resolver.get::<String>()?.as_str(), "42");
            Ok(())
        }
    }

    let runtime = Runtime::builder()
        .with_journal(Arc::new(NullJournal))
        .with_unit(Provider)
        .with_unit(Consumer)
        .build()
        .unwrap();
    assert_eq!(runtime.unit_names(), vec!["provider", "consumer"]);
    runtime.start().unwrap();
    assert_eq!(runtime.get::<String>().unwrap().as_str(), "42");
}
