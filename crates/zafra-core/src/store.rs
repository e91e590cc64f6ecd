//! # Entity Store
//!
//! Generic, ordered, in-memory collection with CRUD by id.
//!
//! - Insertion order is preserved.
//! - `add` assigns the id from the wall clock (epoch milliseconds).
//! - `update` and `remove` with an unknown id leave the collection untouched.
//! - No referential checks: integrity between collections is advisory.
//!
//! ## Ids
//!
//! Two creations within the same clock tick would share a millisecond. The
//! store bumps the id to the next free value instead, so ids stay unique and
//! stay equal to the wall clock whenever no collision happens.

use crate::gateway;
use crate::storage::SlotStore;
use crate::{LedgerError, Record, RecordId};
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

// =============================================================================
// CLOCK
// =============================================================================

/// Source of creation timestamps.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time in epoch milliseconds.
    fn now_millis(&self) -> u64;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}

// =============================================================================
// EDITABLE MARKER
// =============================================================================

/// Records that support in-place edit by id.
///
/// Freight, transactions and harvest intake are append/delete-only and do
/// not implement this, so their stores have no `update`.
pub trait Editable: Record {}

// =============================================================================
// ENTITY STORE
// =============================================================================

/// An ordered collection of one record kind.
pub struct EntityStore<T: Record> {
    records: Vec<T>,
    clock: Arc<dyn Clock>,
    last_issued: u64,
}

impl<T: Record> fmt::Debug for EntityStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("slot", &T::SLOT)
            .field("len", &self.records.len())
            .field("last_issued", &self.last_issued)
            .finish_non_exhaustive()
    }
}

impl<T: Record> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> EntityStore<T> {
    /// Create an empty store using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store using the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Vec::new(),
            clock,
            last_issued: 0,
        }
    }

    /// Create a store populated from its slot in `slots`.
    ///
    /// A missing or unparseable slot yields an empty store. Nothing is
    /// written back.
    pub fn open(slots: &dyn SlotStore, clock: Arc<dyn Clock>) -> Self {
        let mut store = Self::with_clock(clock);
        store.load(gateway::load_collection(slots));
        store
    }

    /// The full collection in insertion order.
    #[must_use]
    pub fn list(&self) -> &[T] {
        &self.records
    }

    /// Find a record by id.
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a new record built from `draft` and return it.
    ///
    /// No duplicate-content check is made.
    pub fn add(&mut self, draft: T::Draft) -> T {
        let id = self.next_id();
        let record = T::assemble(id, draft);
        self.records.push(record.clone());
        record
    }

    /// Remove the record with `id`.
    ///
    /// Returns `true` if a record was removed; an unknown id is a no-op.
    pub fn remove(&mut self, id: RecordId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        self.records.len() != before
    }

    /// Replace the whole collection.
    pub fn load(&mut self, snapshot: Vec<T>) {
        self.records = snapshot;
    }

    /// Write the whole collection to its slot.
    pub fn persist(&self, slots: &mut dyn SlotStore) -> Result<(), LedgerError> {
        gateway::save_collection(slots, &self.records)
    }

    /// Issue the next id: the wall clock, bumped past any id already in use.
    fn next_id(&mut self) -> RecordId {
        let mut candidate = self
            .clock
            .now_millis()
            .max(self.last_issued.saturating_add(1));
        while self.records.iter().any(|r| r.id().0 == candidate) {
            candidate = candidate.saturating_add(1);
        }
        self.last_issued = candidate;
        RecordId(candidate)
    }
}

impl<T: Editable> EntityStore<T> {
    /// Replace the record with `id` by one built from `draft`, keeping the id
    /// and the record's position.
    ///
    /// Returns `true` if a record was replaced; an unknown id is a no-op.
    pub fn update(&mut self, id: RecordId, draft: T::Draft) -> bool {
        match self.records.iter_mut().find(|r| r.id() == id) {
            Some(existing) => {
                *existing = T::assemble(id, draft);
                true
            }
            None => false,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
