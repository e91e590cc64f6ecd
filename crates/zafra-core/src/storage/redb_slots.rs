//! # redb-backed Slot Storage
//!
//! A disk-backed slot store using the redb embedded database.
//!
//! Every slot lives in a single table keyed by the slot name. Each `set` is
//! its own write transaction, so a crash leaves either the previous or the
//! new snapshot of a collection, never a torn one.

use super::SlotStore;
use crate::LedgerError;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;

/// Table of slots: slot key -> serialized collection bytes
const SLOTS: TableDefinition<&str, &[u8]> = TableDefinition::new("slots");

fn io_err(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::IoError(e.to_string())
}

/// A slot store persisted in a redb database file.
pub struct RedbSlots {
    db: Database,
}

impl std::fmt::Debug for RedbSlots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbSlots").finish_non_exhaustive()
    }
}

impl RedbSlots {
    /// Open or create a slot database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let db = Database::create(path.as_ref()).map_err(io_err)?;

        // Create the table up front so reads on a fresh file do not fail.
        let write_txn = db.begin_write().map_err(io_err)?;
        {
            let _ = write_txn.open_table(SLOTS).map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;

        Ok(Self { db })
    }
}

impl SlotStore for RedbSlots {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(SLOTS).map_err(io_err)?;
        let value = table.get(key).map_err(io_err)?;
        Ok(value.map(|guard| guard.value().to_vec()))
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut table = write_txn.open_table(SLOTS).map_err(io_err)?;
            table.insert(key, value).map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;
        Ok(())
    }

    /// Compact the database file, returning whether space was reclaimed.
    fn compact(&mut self) -> Result<bool, LedgerError> {
        self.db.compact().map_err(io_err)
    }

    fn backend_name(&self) -> &'static str {
        "redb"
    }
}

// =============================================================================
// TESTS
// =============================================================================
