//! # zafra-core
//!
//! The in-memory relational data layer for the Zafra farm-logistics ledger.
//!
//! Six linked collections live here: land parcels, suppliers, carriers,
//! freight trips, financial transactions and harvest-intake entries. The
//! crate provides:
//! - `store`: generic per-collection CRUD (`EntityStore`)
//! - `resolver`: foreign-key to display-name lookup, frozen at creation time
//! - `derivation`: VAT and freight-rate formulas
//! - `aggregate`: grouped (per parent) and grand-total sums
//! - `filter`: substring search and multi-dimension equality filters
//! - `storage` + `gateway`: whole-collection snapshots in named key-value slots
//! - `formats`: binary backup archive of every slot
//! - `export`: stable row enumeration handed to a print sink
//! - `ledger`: the facade that wires all of the above together
//!
//! ## Architectural Constraints
//!
//! - Pure and synchronous: NO async, NO network dependencies
//! - Views (filters, aggregates) are recomputed on every call, never cached
//! - Persistence is explicit: a collection is written only after a mutation

// =============================================================================
// MODULES
// =============================================================================

pub mod aggregate;
pub mod derivation;
pub mod export;
pub mod filter;
pub mod formats;
pub mod gateway;
pub mod ledger;
pub mod numeric;
pub mod primitives;
pub mod records;
pub mod resolver;
pub mod storage;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{LedgerError, Record, RecordId, Slot};

pub use records::{
    Carrier, CarrierDraft, FreightDraft, FreightRecord, HarvestDraft, HarvestIntake, LandParcel,
    ParcelDraft, Supplier, SupplierDraft, SupplierType, Transaction, TransactionDraft,
};

// =============================================================================
// RE-EXPORTS: Engines
// =============================================================================

pub use aggregate::{
    CarrierFreightTotals, HarvestTotals, SupplierBalance, freight_by_carrier,
    harvest_grand_total, transactions_by_supplier,
};
pub use export::{ExportTable, PrintSink, export_rows};
pub use filter::{
    Dimension, HarvestFilter, Searchable, distinct_products, filter_by_dimensions, filter_by_text,
};
pub use ledger::{Collections, Ledger, LedgerCollection, LedgerCounts};
pub use resolver::{Linked, Named, resolve_name};
pub use store::{Clock, Editable, EntityStore, FixedClock, SystemClock};

// =============================================================================
// RE-EXPORTS: Persistence
// =============================================================================

pub use formats::{LedgerArchive, PersistenceHeader, SlotImage, archive_from_bytes, archive_to_bytes};
pub use storage::{FileSlots, MemorySlots, RedbSlots, SlotStore};
