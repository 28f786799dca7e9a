//! Ordered object pool
//!
//! Keeps initialized [`PooledObject`]s for reuse. Among free entries, `acquire` hands
//! out the one with the lowest order key, ties broken by insertion sequence. A leased
//! object is moved out of the pool into its [`Lease`] and moved back on release, so
//! the pool lock is only held for bookkeeping and never while user code constructs or
//! initializes an object.

use hearth_domain::constants::{JOURNAL_CATEGORY_POOL, RELATED_KIND_POOL};
use hearth_domain::error::{Error, Result};
use hearth_domain::events::OperationalEvent;
use hearth_domain::ports::{EventJournal, PooledObject};
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::{debug, warn};

type EntryFactory<T> = Box<dyn Fn() -> Result<T> + Send + Sync>;

/// Identifier of a pool entry, unique within its pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntryId(u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Snapshot of one pool entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolEntryInfo {
    /// Entry identifier
    pub id: EntryId,
    /// Order key observed when the entry was last returned to the pool
    pub order_key: i64,
    /// True while leased
    pub in_use: bool,
}

struct Slot<T> {
    id: EntryId,
    order_key: i64,
    object: Option<T>,
    evict_on_release: bool,
}

struct PoolState<T> {
    slots: Vec<Slot<T>>,
    next_id: u64,
    pending: usize,
}

impl<T> PoolState<T> {
    fn in_use(&self) -> usize {
        self.slots.iter().filter(|slot| slot.object.is_none()).count()
    }

    fn insert(&mut self, object: Option<T>, order_key: i64) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.slots.push(Slot {
            id,
            order_key,
            object,
            evict_on_release: false,
        });
        id
    }

    /// Free slot with the lowest `(order_key, id)` whose object passes `matches`
    fn best_free(&self, matches: &dyn Fn(&T) -> bool) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.object.as_ref().is_some_and(|object| matches(object)))
            .min_by_key(|(_, slot)| (slot.order_key, slot.id))
            .map(|(index, _)| index)
    }
}

/// Pool of reusable, initialized objects
pub struct OrderedPool<T: PooledObject> {
    name: String,
    settings: String,
    capacity: Option<usize>,
    factory: Option<EntryFactory<T>>,
    journal: Option<Arc<dyn EventJournal>>,
    state: Mutex<PoolState<T>>,
}

impl<T: PooledObject + 'static> OrderedPool<T> {
    /// Start building a pool
    pub fn builder(name: impl Into<String>) -> OrderedPoolBuilder<T> {
        OrderedPoolBuilder {
            name: name.into(),
            settings: String::new(),
            capacity: None,
            factory: None,
            journal: None,
        }
    }

    /// Pool name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum number of entries; `None` when unbounded
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.state.lock().slots.len()
    }

    /// True when the pool holds no entry
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of leased entries
    pub fn in_use(&self) -> usize {
        self.state.lock().in_use()
    }

    /// Initialize `object` and add it as a free entry
    ///
    /// # Errors
    ///
    /// `PoolExhausted` when the pool is full; `ComponentConstruction` when
    /// initialization fails, in which case the object is discarded.
    pub fn add(&self, object: T) -> Result<EntryId> {
        let reservation = self.reserve()?;
        let object = self.initialize(object)?;
        let order_key = object.order_key();
        let mut state = reservation.settle();
        let id = state.insert(Some(object), order_key);
        debug!(pool = %self.name, entry = %id, order_key, "Pool entry added");
        Ok(id)
    }

    /// Lease the free entry with the lowest order key
    ///
    /// Grows the pool through its factory when no entry is free.
    ///
    /// # Errors
    ///
    /// `PoolExhausted` when nothing is free and the pool cannot grow;
    /// `ComponentConstruction` when a new entry fails to initialize.
    pub fn acquire(&self) -> Result<Lease<'_, T>> {
        self.acquire_matching(|_| true)
    }

    /// Lease the free entry with the lowest order key among those passing `predicate`
    ///
    /// The pool grows only when no entry at all is free. A new entry that does not
    /// pass `predicate` stays in the pool as a free entry and the call fails with
    /// `PoolExhausted`.
    pub fn acquire_matching<P>(&self, predicate: P) -> Result<Lease<'_, T>>
    where
        P: Fn(&T) -> bool,
    {
        {
            let mut state = self.state.lock();
            if let Some(index) = state.best_free(&predicate) {
                let slot = &mut state.slots[index];
                if let Some(object) = slot.object.take() {
                    return Ok(Lease::new(self, slot.id, object));
                }
            }
            if state.slots.iter().any(|slot| slot.object.is_some()) {
                return Err(Error::pool_exhausted(&self.name, state.in_use()));
            }
        }

        let Some(factory) = &self.factory else {
            return Err(self.exhausted());
        };
        let reservation = self.reserve()?;
        let object = factory().and_then(|object| self.initialize(object))?;

        let order_key = object.order_key();
        let mut state = reservation.settle();
        if predicate(&object) {
            let id = state.insert(None, order_key);
            debug!(pool = %self.name, entry = %id, order_key, "Pool grew for lease");
            Ok(Lease::new(self, id, object))
        } else {
            let id = state.insert(Some(object), order_key);
            debug!(pool = %self.name, entry = %id, "New pool entry does not match the selector");
            Err(Error::pool_exhausted(&self.name, state.in_use()))
        }
    }

    /// Evict an entry
    ///
    /// A free entry is dropped immediately, a leased one when its lease ends.
    /// Returns `false` when the pool has no such entry.
    pub fn remove(&self, id: EntryId) -> bool {
        let mut state = self.state.lock();
        let Some(index) = state.slots.iter().position(|slot| slot.id == id) else {
            return false;
        };
        if state.slots[index].object.is_some() {
            state.slots.remove(index);
            debug!(pool = %self.name, entry = %id, "Pool entry removed");
        } else {
            state.slots[index].evict_on_release = true;
            debug!(pool = %self.name, entry = %id, "Pool entry will be removed on release");
        }
        true
    }

    /// Entries in handout order
    pub fn entries(&self) -> Vec<PoolEntryInfo> {
        let state = self.state.lock();
        let mut entries: Vec<_> = state
            .slots
            .iter()
            .map(|slot| PoolEntryInfo {
                id: slot.id,
                order_key: slot.order_key,
                in_use: slot.object.is_none(),
            })
            .collect();
        entries.sort_by_key(|entry| (entry.order_key, entry.id));
        entries
    }

    fn reserve(&self) -> Result<Reservation<'_, T>> {
        let mut state = self.state.lock();
        if let Some(capacity) = self.capacity {
            if state.slots.len() + state.pending >= capacity {
                return Err(Error::pool_exhausted(&self.name, state.in_use()));
            }
        }
        state.pending += 1;
        Ok(Reservation {
            pool: self,
            settled: false,
        })
    }

    fn initialize(&self, mut object: T) -> Result<T> {
        match object.initialize(&self.settings) {
            Ok(()) => Ok(object),
            Err(error) => {
                warn!(pool = %self.name, error = %error, "Pool entry failed to initialize");
                if let Some(journal) = &self.journal {
                    journal.record(
                        OperationalEvent::warning(JOURNAL_CATEGORY_POOL, "Pool entry discarded")
                            .with_detail("initialization failed")
                            .with_error(&error)
                            .with_related(RELATED_KIND_POOL, self.name.clone()),
                    );
                }
                Err(Error::construction_failure(
                    format!("entry of pool '{}'", self.name),
                    &Arc::new(error),
                ))
            }
        }
    }

    fn exhausted(&self) -> Error {
        Error::pool_exhausted(&self.name, self.state.lock().in_use())
    }

    fn release(&self, id: EntryId, object: T) {
        let order_key = object.order_key();
        let mut state = self.state.lock();
        let Some(index) = state.slots.iter().position(|slot| slot.id == id) else {
            return;
        };
        if state.slots[index].evict_on_release {
            state.slots.remove(index);
            debug!(pool = %self.name, entry = %id, "Pool entry removed on release");
        } else {
            let slot = &mut state.slots[index];
            slot.order_key = order_key;
            slot.object = Some(object);
        }
    }

    fn evict(&self, id: EntryId) {
        let mut state = self.state.lock();
        state.slots.retain(|slot| slot.id != id);
        debug!(pool = %self.name, entry = %id, "Pool entry removed");
    }
}

/// Capacity held for an entry under construction
///
/// Dropped unsettled (failed or panicking construction), it gives the slot back.
struct Reservation<'p, T: PooledObject + 'static> {
    pool: &'p OrderedPool<T>,
    settled: bool,
}

impl<'p, T: PooledObject + 'static> Reservation<'p, T> {
    /// Convert the reservation into a slot; the caller inserts under the returned lock
    fn settle(mut self) -> MutexGuard<'p, PoolState<T>> {
        self.settled = true;
        let pool = self.pool;
        let mut state = pool.state.lock();
        state.pending -= 1;
        state
    }
}

impl<T: PooledObject + 'static> Drop for Reservation<'_, T> {
    fn drop(&mut self) {
        if !self.settled {
            self.pool.state.lock().pending -= 1;
        }
    }
}

impl<T: PooledObject> fmt::Debug for OrderedPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedPool")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

/// Builder for [`OrderedPool`]
pub struct OrderedPoolBuilder<T: PooledObject> {
    name: String,
    settings: String,
    capacity: Option<usize>,
    factory: Option<EntryFactory<T>>,
    journal: Option<Arc<dyn EventJournal>>,
}

impl<T: PooledObject + 'static> OrderedPoolBuilder<T> {
    /// Settings blob passed to every entry's initialization
    #[must_use]
    pub fn settings(mut self, settings: impl Into<String>) -> Self {
        self.settings = settings.into();
        self
    }

    /// Maximum number of entries
    #[must_use]
    pub fn capacity(mut self, capacity: Option<usize>) -> Self {
        self.capacity = capacity;
        self
    }

    /// Factory used to grow the pool when no entry is free
    #[must_use]
    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Journal receiving discarded-entry events
    #[must_use]
    pub fn journal(mut self, journal: Arc<dyn EventJournal>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Build the pool
    pub fn build(self) -> OrderedPool<T> {
        OrderedPool {
            name: self.name,
            settings: self.settings,
            capacity: self.capacity,
            factory: self.factory,
            journal: self.journal,
            state: Mutex::new(PoolState {
                slots: Vec::new(),
                next_id: 0,
                pending: 0,
            }),
        }
    }
}

/// Exclusive use of a pool entry
///
/// Dropping the lease returns the entry to the pool with its state intact.
pub struct Lease<'p, T: PooledObject + 'static> {
    pool: &'p OrderedPool<T>,
    id: EntryId,
    object: Option<T>,
}

impl<'p, T: PooledObject + 'static> Lease<'p, T> {
    fn new(pool: &'p OrderedPool<T>, id: EntryId, object: T) -> Self {
        Self {
            pool,
            id,
            object: Some(object),
        }
    }

    /// Identifier of the leased entry
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Return the entry to the pool
    pub fn release(self) {
        drop(self);
    }

    /// Evict the entry instead of returning it
    pub fn remove(mut self) {
        if self.object.take().is_some() {
            self.pool.evict(self.id);
        }
    }
}

impl<T: PooledObject + 'static> fmt::Debug for Lease<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease")
            .field("pool", &self.pool.name)
            .field("id", &self.id)
            .finish()
    }
}

impl<T: PooledObject + 'static> Deref for Lease<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.object {
            Some(object) => object,
            None => unreachable!("lease {} used after release", self.id),
        }
    }
}

impl<T: PooledObject + 'static> DerefMut for Lease<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.object {
            Some(object) => object,
            None => unreachable!("lease {} used after release", self.id),
        }
    }
}

impl<T: PooledObject + 'static> Drop for Lease<'_, T> {
    fn drop(&mut self) {
        if let Some(object) = self.object.take() {
            self.pool.release(self.id, object);
        }
    }
}
