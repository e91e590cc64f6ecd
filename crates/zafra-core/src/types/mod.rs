//! # Core Type Definitions
//!
//! Identifiers, slot names, the `Record` contract shared by all six
//! collections, and the crate-wide error type.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use thiserror::Error;

// =============================================================================
// RECORD IDENTIFIER
// =============================================================================

/// Identifier of a record within its collection.
///
/// Assigned from the creation-time wall clock in epoch milliseconds.
/// Serialized as a bare JSON number.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    /// The "nothing selected" id used by input forms.
    pub const UNSET: Self = Self(0);

    /// Get the raw id value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Whether this id is the unset sentinel.
    #[must_use]
    pub const fn is_unset(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

// =============================================================================
// SLOTS
// =============================================================================

/// Named slot of the durable key-value store holding one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Parcels,
    Suppliers,
    Carriers,
    Transactions,
    Freight,
    HarvestIntake,
}

impl Slot {
    /// Every slot, in the order collections are loaded.
    pub const ALL: [Self; 6] = [
        Self::Parcels,
        Self::Suppliers,
        Self::Carriers,
        Self::Transactions,
        Self::Freight,
        Self::HarvestIntake,
    ];

    /// The fixed store key of this slot.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Parcels => "parcels",
            Self::Suppliers => "suppliers",
            Self::Carriers => "carriers",
            Self::Transactions => "transactions",
            Self::Freight => "freight",
            Self::HarvestIntake => "harvest-intake",
        }
    }

    /// Look a slot up by its store key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.key() == key)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// =============================================================================
// RECORD CONTRACT
// =============================================================================

/// A record shape storable in an `EntityStore`.
///
/// `Draft` is the record without its id. `assemble` is the single place a
/// stored record is built, so derived fields are computed exactly once.
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// The record contents supplied by the caller, minus the id.
    type Draft;

    /// The slot this collection is persisted under.
    const SLOT: Slot;

    /// The record's id.
    fn id(&self) -> RecordId;

    /// Build the stored record from an assigned id and its draft.
    fn assemble(id: RecordId, draft: Self::Draft) -> Self;
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the ledger.
///
/// Lookup misses and unknown ids are NOT errors: they resolve to absent
/// values or silent no-ops. Only input rejection and storage I/O surface here.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A record failed a required-field check.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// A numeric field could not be parsed (strict parsing only).
    #[error("Cannot parse '{input}' as a number for {field}")]
    Parse { field: String, input: String },

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O or storage-engine error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
