//! # Persistence Gateway
//!
//! Moves whole collections between memory and their named slots.
//!
//! - Save writes the full serialized collection under the record's slot.
//! - Load returns an empty collection when the slot is absent or its
//!   contents do not parse; the failure is logged and never surfaced.
//! - Loading never writes.

use crate::storage::SlotStore;
use crate::{LedgerError, Record};

/// Serialize a collection to its slot representation (a JSON array).
pub fn encode_collection<T: Record>(records: &[T]) -> Result<Vec<u8>, LedgerError> {
    serde_json::to_vec(records).map_err(|e| LedgerError::SerializationError(e.to_string()))
}

/// Parse a slot representation back into a collection.
pub fn decode_collection<T: Record>(bytes: &[u8]) -> Result<Vec<T>, LedgerError> {
    serde_json::from_slice(bytes).map_err(|e| LedgerError::DeserializationError(e.to_string()))
}

/// Read the collection stored under `T::SLOT`.
///
/// Absent, unreadable and malformed slots all yield an empty collection.
pub fn load_collection<T: Record>(slots: &dyn SlotStore) -> Vec<T> {
    let key = T::SLOT.key();
    let bytes = match slots.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            tracing::debug!(slot = key, "slot absent, starting empty");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(slot = key, error = %e, "slot unreadable, starting empty");
            return Vec::new();
        }
    };

    match decode_collection(&bytes) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(slot = key, error = %e, "slot malformed, starting empty");
            Vec::new()
        }
    }
}

/// Write the full collection under `T::SLOT`, replacing the previous value.
pub fn save_collection<T: Record>(
    slots: &mut dyn SlotStore,
    records: &[T],
) -> Result<(), LedgerError> {
    let bytes = encode_collection(records)?;
    slots.set(T::SLOT.key(), &bytes)?;
    tracing::debug!(slot = T::SLOT.key(), count = records.len(), "slot saved");
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
