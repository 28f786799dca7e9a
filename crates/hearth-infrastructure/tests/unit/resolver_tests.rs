//! Resolver tests: singleton sharing, transients, cycles and lazy activation

use hearth_domain::ports::{Resolve, ResolveExt};
use hearth_domain::{ConstructionState, ContractKey, Error, Result};
use hearth_infrastructure::di::{Binding, ConfigurationUnit, Registrar, Runtime};
use hearth_infrastructure::journal::NullJournal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[derive(Debug)]
struct Clock(u64);

#[derive(Debug)]
struct Alpha;

#[derive(Debug)]
struct Beta;

#[derive(Debug)]
struct Node;

fn runtime() -> Runtime {
    Runtime::builder()
        .with_journal(Arc::new(NullJournal))
        .build()
        .unwrap()
}

#[test]
fn test_singleton_constructed_once_across_threads() {
    let runtime = runtime();
    let builds = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&builds);
    runtime
        .register(
            Binding::singleton(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(20));
                Ok(Arc::new(Clock(7)))
            })
            .lazy(),
        )
        .unwrap();

    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let runtime = runtime.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                runtime.get::<Clock>().unwrap()
            })
        })
        .collect();
    let clocks: Vec<Arc<Clock>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert!(clocks.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    assert_eq!(clocks[0].0, 7);
}

#[test]
fn test_transient_builds_fresh_instances() {
    let runtime = runtime();
    runtime
        .register(Binding::transient(|_| Ok(Arc::new(Clock(1)))))
        .unwrap();

    let first = runtime.get::<Clock>().unwrap();
    let second = runtime.get::<Clock>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(
        runtime
            .components()
            .iter()
            .find(|info| info.contract == ContractKey::of::<Clock>().to_string())
            .unwrap()
            .state,
        None
    );
}

#[test]
fn test_dependencies_resolve_through_context() {
    let runtime = runtime();
    runtime
        .register(Binding::instance(Arc::new(Clock(42))).named("utc"))
        .unwrap();
    runtime
        .register(Binding::singleton(|ctx| {
            let clock = ctx.get_named::<Clock>("utc")?;
            assert_eq!(ctx.depth(), 1);
            Ok(Arc::new(clock.0.to_string()))
        }))
        .unwrap();

    assert_eq!(runtime.get::<String>().unwrap().as_str(), "42");
}

#[test]
fn test_missing_binding_reports_contract() {
    let runtime = runtime();
    let error = runtime.get::<Clock>().unwrap_err();
    assert!(error.is_binding_not_found());
    assert!(runtime.try_get::<Clock>().unwrap().is_none());
}

#[test]
fn test_two_node_cycle_is_detected() {
    let runtime = runtime();
    runtime
        .register(Binding::singleton(|ctx| {
            ctx.get::<Beta>()?;
            Ok(Arc::new(Alpha))
        }))
        .unwrap();
    runtime
        .register(Binding::singleton(|ctx| {
            ctx.get::<Alpha>()?;
            Ok(Arc::new(Beta))
        }))
        .unwrap();

    let error = runtime.get::<Alpha>().unwrap_err();
    let Error::CircularDependency { chain } = &error else {
        panic!("expected a circular dependency, got {error}");
    };
    assert_eq!(chain.len(), 3);
    assert_eq!(chain[0], chain[2]);
    assert!(chain[0].ends_with("Alpha"));
    assert!(chain[1].ends_with("Beta"));

    // The failed construction is cached and replayed
    assert!(runtime.get::<Beta>().unwrap_err().is_circular_dependency());
    assert_eq!(
        construction_state::<Alpha>(&runtime),
        Some(ConstructionState::Failed)
    );
}

#[test]
fn test_five_node_cycle_names_every_member() {
    let runtime = runtime();
    for index in 0..5 {
        let next = format!("n{}", (index + 1) % 5);
        runtime
            .register(
                Binding::singleton(move |ctx| {
                    ctx.get_named::<Node>(&next)?;
                    Ok(Arc::new(Node))
                })
                .named(format!("n{index}")),
            )
            .unwrap();
    }

    let error = runtime.get_named::<Node>("n2").unwrap_err();
    let Error::CircularDependency { chain } = &error else {
        panic!("expected a circular dependency, got {error}");
    };
    assert_eq!(chain.len(), 6);
    let names: Vec<&str> = chain
        .iter()
        .map(|label| label.rsplit('#').next().unwrap())
        .collect();
    assert_eq!(names, vec!["n2", "n3", "n4", "n0", "n1", "n2"]);
}

#[test]
fn test_cross_thread_cycle_fails_instead_of_deadlocking() {
    let runtime = runtime();
    let barrier = Arc::new(Barrier::new(2));
    let alpha_barrier = Arc::clone(&barrier);
    runtime
        .register(
            Binding::singleton(move |ctx| {
                alpha_barrier.wait();
                ctx.get::<Beta>()?;
                Ok(Arc::new(Alpha))
            })
            .lazy(),
        )
        .unwrap();
    let beta_barrier = Arc::clone(&barrier);
    runtime
        .register(
            Binding::singleton(move |ctx| {
                beta_barrier.wait();
                ctx.get::<Alpha>()?;
                Ok(Arc::new(Beta))
            })
            .lazy(),
        )
        .unwrap();

    let alpha_runtime = runtime.clone();
    let alpha = thread::spawn(move || alpha_runtime.get::<Alpha>().map(|_| ()));
    let beta_runtime = runtime.clone();
    let beta = thread::spawn(move || beta_runtime.get::<Beta>().map(|_| ()));

    let alpha = alpha.join().unwrap();
    let beta = beta.join().unwrap();
    assert!(alpha.unwrap_err().is_circular_dependency());
    assert!(beta.unwrap_err().is_circular_dependency());
}

#[test]
fn test_factory_failure_is_cached_and_wrapped() {
    let runtime = runtime();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    runtime
        .register(Binding::singleton(move |_| -> Result<Arc<Clock>> {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(Error::component("clock source unavailable"))
        }))
        .unwrap();

    for _ in 0..3 {
        let error = runtime.get::<Clock>().unwrap_err();
        assert!(matches!(error, Error::ComponentConstruction { .. }));
        assert!(matches!(error.root_cause(), Error::Component { .. }));
    }
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

struct CountingUnit {
    activations: Arc<AtomicUsize>,
}

impl ConfigurationUnit for CountingUnit {
    fn name(&self) -> &str {
        "counting"
    }

    fn declare_lazy_bindings(&self, registrar: &Registrar<'_>) -> Result<()> {
        registrar.register(Binding::singleton(|_| Ok(Arc::new(Clock(5)))))?;
        registrar.register(Binding::transient(|_| Ok(Arc::new(Node))))
    }

    fn on_first_activation(&self, resolver: &dyn Resolve) -> Result<()> {
        thread::sleep(Duration::from_millis(10));
        // Lazy bindings of the activating unit resolve inside its own activation
        resolver.get::<Clock>()?;
        self.activations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_panicking_factory_marks_singleton_failed() {
    let runtime = runtime();
    runtime
        .register(Binding::singleton(|_| -> Result<Arc<Node>> { panic!("factory blew up") }).lazy())
        .unwrap();

    let worker = runtime.clone();
    assert!(thread::spawn(move || worker.get::<Node>()).join().is_err());

    assert_eq!(
        construction_state::<Node>(&runtime),
        Some(ConstructionState::Failed)
    );
    let error = runtime.get::<Node>().unwrap_err();
    assert!(error.to_string().contains("panicked"));
}

#[test]
fn test_lazy_activation_runs_once_under_contention() {
    let activations = Arc::new(AtomicUsize::new(0));
    let runtime = Runtime::builder()
        .with_journal(Arc::new(NullJournal))
        .with_unit(CountingUnit {
            activations: Arc::clone(&activations),
        })
        .build()
        .unwrap();
    runtime.start().unwrap();
    assert_eq!(activations.load(Ordering::SeqCst), 0);

    let barrier = Arc::new(Barrier::new(50));
    let handles: Vec<_> = (0..50)
        .map(|index| {
            let runtime = runtime.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                if index % 2 == 0 {
                    runtime.get::<Clock>().map(|_| ())
                } else {
                    runtime.get::<Node>().map(|_| ())
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert_eq!(activations.load(Ordering::SeqCst), 1);
}

struct FailingUnit;

impl ConfigurationUnit for FailingUnit {
    fn name(&self) -> &str {
        "failing"
    }

    fn declare_lazy_bindings(&self, registrar: &Registrar<'_>) -> Result<()> {
        registrar.register(Binding::singleton(|_| Ok(Arc::new(Clock(5)))))
    }

    fn on_first_activation(&self, _resolver: &dyn Resolve) -> Result<()> {
        Err(Error::component("activation refused"))
    }
}

#[test]
fn test_failed_activation_fails_every_lazy_binding() {
    let runtime = Runtime::builder()
        .with_journal(Arc::new(NullJournal))
        .with_unit(FailingUnit)
        .build()
        .unwrap();
    runtime.start().unwrap();

    for _ in 0..2 {
        let error = runtime.get::<Clock>().unwrap_err();
        assert!(matches!(error.root_cause(), Error::Component { .. }));
    }
}

#[test]
fn test_resolution_after_stop_is_rejected() {
    let runtime = runtime();
    runtime
        .register(Binding::instance(Arc::new(Clock(1))))
        .unwrap();
    runtime.start().unwrap();
    runtime.stop().unwrap();

    assert!(runtime.get::<Clock>().unwrap_err().is_invalid_state());
}

fn construction_state<T: 'static>(runtime: &Runtime) -> Option<ConstructionState> {
    let key = ContractKey::of::<T>().to_string();
    runtime
        .components()
        .into_iter()
        .find(|info| info.contract == key)
        .and_then(|info| info.state)
}
