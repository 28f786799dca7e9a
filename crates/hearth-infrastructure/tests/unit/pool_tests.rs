//! Ordered pool tests

use hearth_domain::ports::PooledObject;
use hearth_domain::{Error, Result};
use hearth_infrastructure::config::{ConfigBuilder, PoolConfig};
use hearth_infrastructure::di::Runtime;
use hearth_infrastructure::journal::{BroadcastJournal, NullJournal};
use hearth_infrastructure::pool::OrderedPool;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::thread;

#[derive(Debug)]
struct Connection {
    key: i64,
    settings: Option<String>,
}

impl Connection {
    fn new(key: i64) -> Self {
        Self {
            key,
            settings: None,
        }
    }
}

impl PooledObject for Connection {
    fn initialize(&mut self, settings: &str) -> Result<()> {
        if settings == "unreachable" {
            return Err(Error::component("connection refused"));
        }
        self.settings = Some(settings.to_string());
        Ok(())
    }

    fn order_key(&self) -> i64 {
        self.key
    }
}

fn pool_of(keys: &[i64]) -> OrderedPool<Connection> {
    let pool = OrderedPool::builder("connections").build();
    for key in keys {
        pool.add(Connection::new(*key)).unwrap();
    }
    pool
}

#[test]
fn test_acquire_hands_out_lowest_order_key_first() {
    let pool = pool_of(&[3, 1, 2]);

    let first = pool.acquire().unwrap();
    let second = pool.acquire().unwrap();
    let third = pool.acquire().unwrap();
    assert_eq!((first.key, second.key, third.key), (1, 2, 3));
    assert_eq!(pool.in_use(), 3);

    let exhausted = pool.acquire().unwrap_err();
    assert!(exhausted.is_pool_exhausted());

    drop(second);
    assert_eq!(pool.acquire().unwrap().key, 2);
}

#[test]
fn test_order_key_is_refreshed_on_release() {
    let pool = pool_of(&[3, 1, 2]);

    let mut lease = pool.acquire().unwrap();
    assert_eq!(lease.key, 1);
    lease.key = 10;
    lease.release();

    let keys: Vec<i64> = pool.entries().iter().map(|entry| entry.order_key).collect();
    assert_eq!(keys, vec![2, 3, 10]);
    assert_eq!(pool.acquire().unwrap().key, 2);
}

#[test]
fn test_entries_are_initialized_with_settings_before_use() {
    let pool = OrderedPool::builder("connections")
        .settings("postgres://localhost")
        .build();
    pool.add(Connection::new(1)).unwrap();

    let lease = pool.acquire().unwrap();
    assert_eq!(lease.settings.as_deref(), Some("postgres://localhost"));
}

#[test]
fn test_pool_grows_through_factory_up_to_capacity() {
    let next = Arc::new(AtomicI64::new(0));
    let counter = Arc::clone(&next);
    let pool = OrderedPool::builder("connections")
        .capacity(Some(2))
        .factory(move || Ok(Connection::new(counter.fetch_add(1, Ordering::SeqCst))))
        .build();

    let a = pool.acquire().unwrap();
    let b = pool.acquire().unwrap();
    assert_eq!(pool.len(), 2);
    assert!(pool.acquire().unwrap_err().is_pool_exhausted());

    drop(a);
    drop(b);
    assert_eq!(pool.acquire().unwrap().key, 0);
    assert_eq!(next.load(Ordering::SeqCst), 2);
}

#[test]
fn test_capacity_holds_under_concurrent_acquire() {
    let next = Arc::new(AtomicI64::new(0));
    let counter = Arc::clone(&next);
    let pool = Arc::new(
        OrderedPool::builder("connections")
            .capacity(Some(4))
            .factory(move || Ok(Connection::new(counter.fetch_add(1, Ordering::SeqCst))))
            .build(),
    );

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                for _ in 0..50 {
                    if let Ok(lease) = pool.acquire() {
                        assert!(lease.settings.is_some());
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(pool.len() <= 4);
    assert_eq!(pool.in_use(), 0);
}

#[test]
fn test_failed_initialization_discards_entry_and_journals() {
    let journal = Arc::new(BroadcastJournal::new(8));
    let mut events = journal.subscribe();
    let pool = OrderedPool::builder("connections")
        .settings("unreachable")
        .journal(journal)
        .build();

    let error = pool.add(Connection::new(1)).unwrap_err();
    assert!(matches!(error, Error::ComponentConstruction { .. }));
    assert!(pool.is_empty());

    let event = events.try_recv().unwrap();
    assert_eq!(event.summary, "Pool entry discarded");
    assert_eq!(event.related.unwrap().id, "connections");
}

#[test]
fn test_acquire_matching_filters_candidates() {
    let pool = pool_of(&[1, 2, 3, 4]);

    let even = pool.acquire_matching(|conn| conn.key % 2 == 0).unwrap();
    assert_eq!(even.key, 2);
    let none = pool.acquire_matching(|conn| conn.key > 100).unwrap_err();
    assert!(none.is_pool_exhausted());
}

#[test]
fn test_unmatched_acquire_grows_only_without_free_entries() {
    let next = Arc::new(AtomicI64::new(1));
    let keys = Arc::clone(&next);
    let pool = OrderedPool::builder("connections")
        .factory(move || Ok(Connection::new(keys.fetch_add(1, Ordering::SeqCst))))
        .build();

    for _ in 0..100 {
        let error = pool.acquire_matching(|conn| conn.key < 0).unwrap_err();
        assert!(error.is_pool_exhausted());
    }

    assert_eq!(pool.len(), 1);
    assert_eq!(pool.in_use(), 0);
    assert_eq!(next.load(Ordering::SeqCst), 2);
}

#[test]
fn test_panicking_factory_releases_reserved_capacity() {
    let calls = Arc::new(AtomicI64::new(0));
    let counter = Arc::clone(&calls);
    let pool = OrderedPool::builder("connections")
        .capacity(Some(1))
        .factory(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("factory blew up");
            }
            Ok(Connection::new(7))
        })
        .build();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| pool.acquire().map(|lease| lease.key)));
    assert!(outcome.is_err());
    assert!(pool.is_empty());

    let lease = pool.acquire().unwrap();
    assert_eq!(lease.key, 7);
    assert_eq!(pool.len(), 1);
}

#[test]
fn test_remove_evicts_free_and_leased_entries() {
    let pool = pool_of(&[1, 2, 3]);
    let entries = pool.entries();

    assert!(pool.remove(entries[2].id));
    assert_eq!(pool.len(), 2);

    let lease = pool.acquire().unwrap();
    assert!(pool.remove(lease.id()));
    assert_eq!(pool.len(), 2);
    drop(lease);
    assert_eq!(pool.len(), 1);

    let lease = pool.acquire().unwrap();
    assert_eq!(lease.key, 2);
    lease.remove();
    assert!(pool.is_empty());
    assert!(!pool.remove(entries[0].id));
}

#[test]
fn test_pool_binding_applies_configured_overrides() {
    let config = ConfigBuilder::new()
        .with_pool(
            "connections",
            PoolConfig {
                capacity: Some(1),
                settings: "configured".to_string(),
            },
        )
        .build();
    let runtime = Runtime::builder()
        .with_config(config)
        .with_journal(Arc::new(NullJournal))
        .build()
        .unwrap();
    runtime
        .registrar()
        .pool("connections", Some(8), || Ok(Connection::new(1)))
        .unwrap();
    runtime.start().unwrap();

    let pool = runtime.pool::<Connection>("connections").unwrap();
    assert_eq!(pool.capacity(), Some(1));
    let lease = pool.acquire().unwrap();
    assert_eq!(lease.settings.as_deref(), Some("configured"));
    assert!(pool.acquire().unwrap_err().is_pool_exhausted());
}
