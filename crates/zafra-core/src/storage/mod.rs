//! # Slot Storage
//!
//! The durable key-value store the ledger persists into. Only its
//! get/set-by-key contract matters to the core: one slot per collection,
//! the value being the serialized collection.
//!
//! Backends:
//! - `MemorySlots`: in-process map (tests, throwaway sessions)
//! - `RedbSlots`: redb embedded database, one table of slot -> bytes
//! - `FileSlots`: one `<slot>.json` file per slot in a directory

mod file_slots;
mod redb_slots;

pub use file_slots::FileSlots;
pub use redb_slots::RedbSlots;

use crate::LedgerError;
use std::collections::BTreeMap;
use std::fmt;

/// A get/set-by-key store of opaque slot values.
///
/// Writes are last-write-wins; there is no merge or conflict detection.
pub trait SlotStore: Send + Sync + fmt::Debug {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), LedgerError>;

    /// Reclaim unused space, returning whether anything was reclaimed.
    ///
    /// Backends without free-space management have nothing to do.
    fn compact(&mut self) -> Result<bool, LedgerError> {
        Ok(false)
    }

    /// Human-readable backend name for status output.
    fn backend_name(&self) -> &'static str;
}

// =============================================================================
// IN-MEMORY SLOTS
// =============================================================================

/// Slot store held entirely in memory.
///
/// Counts writes so callers can observe when persistence happened.
#[derive(Debug, Clone, Default)]
pub struct MemorySlots {
    values: BTreeMap<String, Vec<u8>>,
    writes: usize,
}

impl MemorySlots {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with raw slot values.
    #[must_use]
    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            writes: 0,
        }
    }

    /// Number of `set` calls served so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl SlotStore for MemorySlots {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        self.values.insert(key.to_string(), value.to_vec());
        self.writes += 1;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

// =============================================================================
// TESTS
// =============================================================================
