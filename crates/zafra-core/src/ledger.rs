//! # Ledger
//!
//! The facade wiring the six entity stores to one slot store.
//!
//! Lifecycle:
//! 1. Open: every store is populated from its slot. Nothing is written.
//! 2. Mutate: `add_*`, `update`, `remove` change one store, then that whole
//!    collection is written back to its slot.
//! 3. View: searches, dimension filters and aggregates are computed from the
//!    current collections on every call.
//!
//! ## Persistence Failures
//!
//! Writes after a mutation are fire-and-forget: a failing slot store is
//! logged at `warn` and the in-memory mutation stands.

use crate::aggregate::{self, CarrierFreightTotals, HarvestTotals, SupplierBalance};
use crate::filter::{self, HarvestFilter, Searchable};
use crate::formats::{self, LedgerArchive};
use crate::gateway;
use crate::resolver::Linked;
use crate::storage::{FileSlots, MemorySlots, RedbSlots, SlotStore};
use crate::store::{Clock, Editable, EntityStore, SystemClock};
use crate::{
    Carrier, CarrierDraft, FreightDraft, FreightRecord, HarvestDraft, HarvestIntake, LandParcel,
    LedgerError, ParcelDraft, Record, RecordId, Slot, Supplier, SupplierDraft, Transaction,
    TransactionDraft,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

// =============================================================================
// ERROR LOGGING HELPERS
// =============================================================================

/// Log a persistence failure and drop it.
#[inline]
fn log_and_ignore(result: Result<(), LedgerError>, slot: Slot) {
    if let Err(e) = result {
        tracing::warn!(slot = slot.key(), error = %e, "persist failed, keeping in-memory state");
    }
}

fn require_name(kind: &str, name: &str) -> Result<(), LedgerError> {
    if name.trim().is_empty() {
        return Err(LedgerError::InvalidRecord(format!("{} name is required", kind)));
    }
    Ok(())
}

fn require_id(kind: &str, field: &str, id: RecordId) -> Result<(), LedgerError> {
    if id.is_unset() {
        return Err(LedgerError::InvalidRecord(format!(
            "{} requires a {}",
            kind, field
        )));
    }
    Ok(())
}

// =============================================================================
// COLLECTIONS
// =============================================================================

/// The six entity stores of a ledger.
#[derive(Debug)]
pub struct Collections {
    pub parcels: EntityStore<LandParcel>,
    pub suppliers: EntityStore<Supplier>,
    pub carriers: EntityStore<Carrier>,
    pub freight: EntityStore<FreightRecord>,
    pub transactions: EntityStore<Transaction>,
    pub harvest: EntityStore<HarvestIntake>,
}

impl Collections {
    fn open(slots: &dyn SlotStore, clock: &Arc<dyn Clock>) -> Self {
        Self {
            parcels: EntityStore::open(slots, Arc::clone(clock)),
            suppliers: EntityStore::open(slots, Arc::clone(clock)),
            carriers: EntityStore::open(slots, Arc::clone(clock)),
            freight: EntityStore::open(slots, Arc::clone(clock)),
            transactions: EntityStore::open(slots, Arc::clone(clock)),
            harvest: EntityStore::open(slots, Arc::clone(clock)),
        }
    }
}

/// A record kind held by the ledger.
///
/// Gives generic code access to the right store and the kind's
/// required-field check.
pub trait LedgerCollection: Record {
    /// Human-readable kind name used in messages.
    const KIND: &'static str;

    fn store(collections: &Collections) -> &EntityStore<Self>;

    fn store_mut(collections: &mut Collections) -> &mut EntityStore<Self>;

    /// Reject drafts missing a required field.
    fn check(_draft: &Self::Draft) -> Result<(), LedgerError> {
        Ok(())
    }
}

impl LedgerCollection for LandParcel {
    const KIND: &'static str = "Parcel";

    fn store(collections: &Collections) -> &EntityStore<Self> {
        &collections.parcels
    }

    fn store_mut(collections: &mut Collections) -> &mut EntityStore<Self> {
        &mut collections.parcels
    }

    fn check(draft: &ParcelDraft) -> Result<(), LedgerError> {
        require_name(Self::KIND, &draft.name)
    }
}

impl LedgerCollection for Supplier {
    const KIND: &'static str = "Supplier";

    fn store(collections: &Collections) -> &EntityStore<Self> {
        &collections.suppliers
    }

    fn store_mut(collections: &mut Collections) -> &mut EntityStore<Self> {
        &mut collections.suppliers
    }

    fn check(draft: &SupplierDraft) -> Result<(), LedgerError> {
        require_name(Self::KIND, &draft.name)
    }
}

impl LedgerCollection for Carrier {
    const KIND: &'static str = "Carrier";

    fn store(collections: &Collections) -> &EntityStore<Self> {
        &collections.carriers
    }

    fn store_mut(collections: &mut Collections) -> &mut EntityStore<Self> {
        &mut collections.carriers
    }

    fn check(draft: &CarrierDraft) -> Result<(), LedgerError> {
        require_name(Self::KIND, &draft.name)
    }
}

impl LedgerCollection for FreightRecord {
    const KIND: &'static str = "Freight";

    fn store(collections: &Collections) -> &EntityStore<Self> {
        &collections.freight
    }

    fn store_mut(collections: &mut Collections) -> &mut EntityStore<Self> {
        &mut collections.freight
    }

    fn check(linked: &Linked<FreightDraft>) -> Result<(), LedgerError> {
        if linked.draft.product.trim().is_empty() {
            return Err(LedgerError::InvalidRecord(
                "Freight product is required".to_string(),
            ));
        }
        require_id(Self::KIND, "carrier", linked.draft.carrier_id)
    }
}

impl LedgerCollection for Transaction {
    const KIND: &'static str = "Transaction";

    fn store(collections: &Collections) -> &EntityStore<Self> {
        &collections.transactions
    }

    fn store_mut(collections: &mut Collections) -> &mut EntityStore<Self> {
        &mut collections.transactions
    }

    fn check(linked: &Linked<TransactionDraft>) -> Result<(), LedgerError> {
        require_id(Self::KIND, "supplier", linked.draft.supplier_id)
    }
}

impl LedgerCollection for HarvestIntake {
    const KIND: &'static str = "Harvest intake";

    fn store(collections: &Collections) -> &EntityStore<Self> {
        &collections.harvest
    }

    fn store_mut(collections: &mut Collections) -> &mut EntityStore<Self> {
        &mut collections.harvest
    }

    fn check(draft: &HarvestDraft) -> Result<(), LedgerError> {
        require_id(Self::KIND, "parcel", draft.parcel_id)?;
        require_id(Self::KIND, "supplier", draft.supplier_id)?;
        require_id(Self::KIND, "carrier", draft.carrier_id)
    }
}

// =============================================================================
// COUNTS
// =============================================================================

/// Record count of every collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LedgerCounts {
    pub parcels: usize,
    pub suppliers: usize,
    pub carriers: usize,
    pub freight: usize,
    pub transactions: usize,
    pub harvest: usize,
}

impl LedgerCounts {
    /// Sum over all collections.
    #[must_use]
    pub fn total(&self) -> usize {
        self.parcels + self.suppliers + self.carriers + self.freight + self.transactions + self.harvest
    }
}

// =============================================================================
// LEDGER
// =============================================================================

/// Six linked collections persisted into one slot store.
#[derive(Debug)]
pub struct Ledger {
    slots: Box<dyn SlotStore>,
    collections: Collections,
}

impl Ledger {
    /// Open a ledger over `slots` using the system clock.
    pub fn open(slots: Box<dyn SlotStore>) -> Self {
        Self::open_with_clock(slots, Arc::new(SystemClock))
    }

    /// Open a ledger over `slots`, issuing ids from `clock`.
    pub fn open_with_clock(slots: Box<dyn SlotStore>, clock: Arc<dyn Clock>) -> Self {
        let collections = Collections::open(slots.as_ref(), &clock);
        let ledger = Self { slots, collections };
        tracing::debug!(
            backend = ledger.backend_name(),
            records = ledger.counts().total(),
            "ledger opened"
        );
        ledger
    }

    /// A fresh ledger backed by memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(Box::new(MemorySlots::new()))
    }

    /// Open a ledger persisted in a redb database file.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        Ok(Self::open(Box::new(RedbSlots::open(path)?)))
    }

    /// Open a ledger persisted as JSON files in a directory.
    pub fn with_files(dir: impl AsRef<Path>) -> Result<Self, LedgerError> {
        Ok(Self::open(Box::new(FileSlots::open(dir)?)))
    }

    /// Name of the slot store backend.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.slots.backend_name()
    }

    /// Reclaim unused space in the slot store.
    ///
    /// Returns whether the backend reclaimed anything.
    pub fn compact(&mut self) -> Result<bool, LedgerError> {
        let reclaimed = self.slots.compact()?;
        tracing::info!(backend = self.backend_name(), reclaimed, "slot store compacted");
        Ok(reclaimed)
    }

    /// Raw stored value of a slot.
    pub fn slot_value(&self, slot: Slot) -> Result<Option<Vec<u8>>, LedgerError> {
        self.slots.get(slot.key())
    }

    /// Direct access to the stores.
    #[must_use]
    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    // -------------------------------------------------------------------------
    // Generic CRUD
    // -------------------------------------------------------------------------

    /// Every record of kind `T`, in insertion order.
    #[must_use]
    pub fn list<T: LedgerCollection>(&self) -> &[T] {
        T::store(&self.collections).list()
    }

    /// The record of kind `T` with `id`.
    #[must_use]
    pub fn get<T: LedgerCollection>(&self, id: RecordId) -> Option<&T> {
        T::store(&self.collections).get(id)
    }

    /// Check, append and persist a record built from `draft`.
    pub fn add<T: LedgerCollection>(&mut self, draft: T::Draft) -> Result<T, LedgerError> {
        T::check(&draft)?;
        let record = T::store_mut(&mut self.collections).add(draft);
        tracing::debug!(kind = T::KIND, id = %record.id(), "record added");
        self.persist::<T>();
        Ok(record)
    }

    /// Replace the record with `id`, keeping its id and position.
    ///
    /// Returns `Ok(false)` for an unknown id; nothing is written then.
    pub fn update<T: LedgerCollection + Editable>(
        &mut self,
        id: RecordId,
        draft: T::Draft,
    ) -> Result<bool, LedgerError> {
        T::check(&draft)?;
        let replaced = T::store_mut(&mut self.collections).update(id, draft);
        if replaced {
            tracing::debug!(kind = T::KIND, %id, "record updated");
            self.persist::<T>();
        }
        Ok(replaced)
    }

    /// Remove the record with `id`.
    ///
    /// Returns `false` for an unknown id; nothing is written then. Dependent
    /// records are left in place.
    pub fn remove<T: LedgerCollection>(&mut self, id: RecordId) -> bool {
        let removed = T::store_mut(&mut self.collections).remove(id);
        if removed {
            tracing::debug!(kind = T::KIND, %id, "record removed");
            self.persist::<T>();
        }
        removed
    }

    /// Replace a whole collection without writing it.
    pub fn load<T: LedgerCollection>(&mut self, snapshot: Vec<T>) {
        T::store_mut(&mut self.collections).load(snapshot);
    }

    /// Records of kind `T` matching a free-text term.
    #[must_use]
    pub fn search<T: LedgerCollection + Searchable>(&self, term: &str) -> Vec<&T> {
        filter::filter_by_text(self.list::<T>(), term)
    }

    fn persist<T: LedgerCollection>(&mut self) {
        let result = T::store(&self.collections).persist(self.slots.as_mut());
        log_and_ignore(result, T::SLOT);
    }

    // -------------------------------------------------------------------------
    // Typed creation
    // -------------------------------------------------------------------------

    pub fn add_parcel(&mut self, draft: ParcelDraft) -> Result<LandParcel, LedgerError> {
        self.add(draft)
    }

    pub fn add_supplier(&mut self, draft: SupplierDraft) -> Result<Supplier, LedgerError> {
        self.add(draft)
    }

    pub fn add_carrier(&mut self, draft: CarrierDraft) -> Result<Carrier, LedgerError> {
        self.add(draft)
    }

    /// Add a freight trip, freezing the carrier's current name onto it.
    ///
    /// An unknown carrier id is accepted; the name is then absent.
    pub fn add_freight(&mut self, draft: FreightDraft) -> Result<FreightRecord, LedgerError> {
        let carrier_id = draft.carrier_id;
        let linked = Linked::resolve(draft, self.collections.carriers.list(), carrier_id);
        self.add(linked)
    }

    /// Add a transaction, freezing the supplier's current name onto it and
    /// computing VAT and total.
    pub fn add_transaction(
        &mut self,
        draft: TransactionDraft,
    ) -> Result<Transaction, LedgerError> {
        let supplier_id = draft.supplier_id;
        let linked = Linked::resolve(draft, self.collections.suppliers.list(), supplier_id);
        self.add(linked)
    }

    pub fn add_harvest(&mut self, draft: HarvestDraft) -> Result<HarvestIntake, LedgerError> {
        self.add(draft)
    }

    // -------------------------------------------------------------------------
    // Views
    // -------------------------------------------------------------------------

    /// Freight sums per carrier.
    #[must_use]
    pub fn freight_totals(&self) -> Vec<CarrierFreightTotals> {
        aggregate::freight_by_carrier(self.collections.carriers.list(), self.collections.freight.list())
    }

    /// Transaction sums and balance per supplier.
    #[must_use]
    pub fn transaction_totals(&self) -> Vec<SupplierBalance> {
        aggregate::transactions_by_supplier(
            self.collections.suppliers.list(),
            self.collections.transactions.list(),
        )
    }

    /// Grand total over every harvest intake, ignoring any filter.
    #[must_use]
    pub fn harvest_totals(&self) -> HarvestTotals {
        aggregate::harvest_grand_total(self.collections.harvest.list())
    }

    /// Harvest intakes admitted by `filter`.
    #[must_use]
    pub fn harvest_filtered(&self, filter: &HarvestFilter) -> Vec<&HarvestIntake> {
        filter::filter_by_dimensions(self.collections.harvest.list(), filter)
    }

    /// Distinct harvest products in first-seen order.
    #[must_use]
    pub fn harvest_products(&self) -> Vec<String> {
        filter::distinct_products(self.collections.harvest.list())
    }

    /// Record count of every collection.
    #[must_use]
    pub fn counts(&self) -> LedgerCounts {
        LedgerCounts {
            parcels: self.collections.parcels.len(),
            suppliers: self.collections.suppliers.len(),
            carriers: self.collections.carriers.len(),
            freight: self.collections.freight.len(),
            transactions: self.collections.transactions.len(),
            harvest: self.collections.harvest.len(),
        }
    }

    // -------------------------------------------------------------------------
    // Backup
    // -------------------------------------------------------------------------

    /// Serialize every collection into one backup archive.
    pub fn backup(&self) -> Result<Vec<u8>, LedgerError> {
        let mut archive = LedgerArchive::default();
        for slot in Slot::ALL {
            archive.insert(slot, self.encode_slot(slot)?);
        }
        formats::archive_to_bytes(&archive)
    }

    /// Replace every collection with the contents of a backup archive and
    /// write them all.
    ///
    /// All-or-nothing: the archive is decoded and every slot written before
    /// memory changes. A bad archive, an unreadable slot or a failed write
    /// leaves both the collections and the slots as they were. Slots missing
    /// from the archive restore as empty collections.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<LedgerCounts, LedgerError> {
        let archive = formats::archive_from_bytes(bytes)?;

        let parcels = decode_slot::<LandParcel>(&archive)?;
        let suppliers = decode_slot::<Supplier>(&archive)?;
        let carriers = decode_slot::<Carrier>(&archive)?;
        let transactions = decode_slot::<Transaction>(&archive)?;
        let freight = decode_slot::<FreightRecord>(&archive)?;
        let harvest = decode_slot::<HarvestIntake>(&archive)?;

        let staged = [
            (Slot::Parcels, gateway::encode_collection(&parcels)?),
            (Slot::Suppliers, gateway::encode_collection(&suppliers)?),
            (Slot::Carriers, gateway::encode_collection(&carriers)?),
            (Slot::Transactions, gateway::encode_collection(&transactions)?),
            (Slot::Freight, gateway::encode_collection(&freight)?),
            (Slot::HarvestIntake, gateway::encode_collection(&harvest)?),
        ];
        self.write_staged(&staged)?;

        self.collections.parcels.load(parcels);
        self.collections.suppliers.load(suppliers);
        self.collections.carriers.load(carriers);
        self.collections.transactions.load(transactions);
        self.collections.freight.load(freight);
        self.collections.harvest.load(harvest);

        let counts = self.counts();
        tracing::info!(records = counts.total(), "ledger restored from backup");
        Ok(counts)
    }

    /// The current contents of `slot`'s collection, serialized.
    fn encode_slot(&self, slot: Slot) -> Result<Vec<u8>, LedgerError> {
        let c = &self.collections;
        match slot {
            Slot::Parcels => gateway::encode_collection(c.parcels.list()),
            Slot::Suppliers => gateway::encode_collection(c.suppliers.list()),
            Slot::Carriers => gateway::encode_collection(c.carriers.list()),
            Slot::Transactions => gateway::encode_collection(c.transactions.list()),
            Slot::Freight => gateway::encode_collection(c.freight.list()),
            Slot::HarvestIntake => gateway::encode_collection(c.harvest.list()),
        }
    }

    /// Write every staged slot, or none of them.
    ///
    /// Previous values are read up front. When a write fails, the slots
    /// already written get their previous value back; a slot that was absent
    /// gets the current in-memory collection instead.
    fn write_staged(&mut self, staged: &[(Slot, Vec<u8>)]) -> Result<(), LedgerError> {
        let mut previous = Vec::with_capacity(staged.len());
        for (slot, _) in staged {
            let before = match self.slots.get(slot.key())? {
                Some(bytes) => bytes,
                None => self.encode_slot(*slot)?,
            };
            previous.push((*slot, before));
        }

        for (written, (slot, bytes)) in staged.iter().enumerate() {
            if let Err(e) = self.slots.set(slot.key(), bytes) {
                tracing::warn!(slot = slot.key(), error = %e, "restore write failed, rolling back");
                for (slot, before) in &previous[..written] {
                    if let Err(undo) = self.slots.set(slot.key(), before) {
                        tracing::warn!(slot = slot.key(), error = %undo, "rollback write failed");
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

fn decode_slot<T: Record>(archive: &LedgerArchive) -> Result<Vec<T>, LedgerError> {
    archive
        .get(T::SLOT)
        .map(gateway::decode_collection::<T>)
        .transpose()
        .map(Option::unwrap_or_default)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FixedClock;

    fn ledger() -> Ledger {
        Ledger::open_with_clock(Box::new(MemorySlots::new()), Arc::new(FixedClock(1_000)))
    }

    fn carrier(name: &str) -> CarrierDraft {
        CarrierDraft {
            name: name.into(),
            ..CarrierDraft::default()
        }
    }

    #[test]
    fn open_reads_existing_slots_without_writing() {
        let slots = MemorySlots::with_values([(
            "carriers",
            r#"[{"id":5,"name":"Fletes Norte","plate":"","phone":"","company":""}]"#,
        )]);
        let ledger = Ledger::open(Box::new(slots));

        assert_eq!(ledger.list::<Carrier>().len(), 1);
        assert_eq!(ledger.slot_value(Slot::Parcels).expect("get"), None);
    }

    #[test]
    fn add_persists_collection() {
        let mut ledger = ledger();
        ledger.add_carrier(carrier("Transportes Sur")).expect("add");

        let raw = ledger.slot_value(Slot::Carriers).expect("get").expect("written");
        let stored: Vec<Carrier> = gateway::decode_collection(&raw).expect("decode");
        assert_eq!(stored, ledger.list::<Carrier>());
    }

    #[test]
    fn blank_name_rejected() {
        let mut ledger = ledger();
        let err = ledger.add_carrier(carrier("   ")).expect_err("must reject");
        assert!(matches!(err, LedgerError::InvalidRecord(_)));
        assert!(ledger.list::<Carrier>().is_empty());
    }

    #[test]
    fn freight_freezes_carrier_name() {
        let mut ledger = ledger();
        let c = ledger.add_carrier(carrier("Transportes Sur")).expect("add");
        let trip = ledger
            .add_freight(FreightDraft {
                product: "Soja".into(),
                distance_km: 100.0,
                rate_per_km: 2.0,
                carrier_id: c.id,
                ..FreightDraft::default()
            })
            .expect("add freight");

        ledger
            .update::<Carrier>(c.id, carrier("Renamed"))
            .expect("update");

        assert_eq!(trip.carrier_name.as_deref(), Some("Transportes Sur"));
        assert_eq!(
            ledger.list::<FreightRecord>()[0].carrier_name.as_deref(),
            Some("Transportes Sur")
        );
        assert_eq!(ledger.list::<FreightRecord>()[0].rate_per_ton, 200.0);
    }

    #[test]
    fn dangling_supplier_gives_absent_name() {
        let mut ledger = ledger();
        let tx = ledger
            .add_transaction(TransactionDraft {
                supplier_id: RecordId(404),
                credits: 10.0,
                ..TransactionDraft::default()
            })
            .expect("add");
        assert_eq!(tx.supplier_name, None);
    }

    #[test]
    fn harvest_requires_all_parents() {
        let mut ledger = ledger();
        let err = ledger
            .add_harvest(HarvestDraft {
                parcel_id: RecordId(1),
                supplier_id: RecordId(2),
                ..HarvestDraft::default()
            })
            .expect_err("carrier missing");
        assert!(err.to_string().contains("carrier"));
    }

    #[test]
    fn remove_unknown_does_not_write() {
        let mut ledger = ledger();
        assert!(!ledger.remove::<Carrier>(RecordId(9)));
        assert_eq!(ledger.slot_value(Slot::Carriers).expect("get"), None);
    }

    #[test]
    fn update_unknown_does_not_write() {
        let mut ledger = ledger();
        assert!(!ledger.update::<Carrier>(RecordId(9), carrier("X")).expect("valid draft"));
        assert_eq!(ledger.slot_value(Slot::Carriers).expect("get"), None);
    }

    #[test]
    fn backup_restore_replaces_everything() {
        let mut source = ledger();
        source.add_carrier(carrier("A")).expect("add");
        source
            .add_parcel(ParcelDraft {
                name: "La Loma".into(),
                area_hectares: f64::NAN,
                ..ParcelDraft::default()
            })
            .expect("add");
        let bytes = source.backup().expect("backup");

        let mut target = ledger();
        target.add_carrier(carrier("stale")).expect("add");
        target.add_carrier(carrier("stale 2")).expect("add");
        let counts = target.restore(&bytes).expect("restore");

        assert_eq!(counts.carriers, 1);
        assert_eq!(counts.parcels, 1);
        assert_eq!(target.list::<Carrier>()[0].name, "A");
        assert!(target.list::<LandParcel>()[0].area_hectares.is_nan());
        assert_eq!(
            target.slot_value(Slot::Carriers).expect("get"),
            source.slot_value(Slot::Carriers).expect("get")
        );
    }

    #[test]
    fn bad_backup_leaves_ledger_untouched() {
        let mut ledger = ledger();
        ledger.add_carrier(carrier("A")).expect("add");
        assert!(ledger.restore(b"ZAFR\x01garbage").is_err());
        assert_eq!(ledger.list::<Carrier>().len(), 1);
    }

    #[test]
    fn compact_without_free_space_management_is_noop() {
        let mut ledger = ledger();
        ledger.add_carrier(carrier("A")).expect("add");
        assert!(!ledger.compact().expect("compact"));
        assert_eq!(ledger.list::<Carrier>().len(), 1);
    }

    /// Slot store that refuses writes to one key.
    #[derive(Debug)]
    struct RejectingSlots {
        inner: MemorySlots,
        reject: &'static str,
    }

    impl SlotStore for RejectingSlots {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
            if key == self.reject {
                return Err(LedgerError::IoError(format!("{} is read-only", key)));
            }
            self.inner.set(key, value)
        }

        fn backend_name(&self) -> &'static str {
            "rejecting"
        }
    }

    #[test]
    fn failed_restore_write_rolls_back_slots_and_memory() {
        let mut source = ledger();
        source
            .add_parcel(ParcelDraft {
                name: "FromBackup".into(),
                ..ParcelDraft::default()
            })
            .expect("add");
        source.add_carrier(carrier("FromBackup")).expect("add");
        let archive = source.backup().expect("backup");

        let old_parcels = r#"[{"id":5,"name":"Old","tenant":"","location":"","partnership":"","company":"","areaHectares":1.0,"policyNumbers":""}]"#;
        let slots = RejectingSlots {
            inner: MemorySlots::with_values([("parcels", old_parcels)]),
            reject: "carriers",
        };
        let mut target = Ledger::open(Box::new(slots));

        assert!(target.restore(&archive).is_err());

        assert_eq!(target.list::<LandParcel>().len(), 1);
        assert_eq!(target.list::<LandParcel>()[0].name, "Old");
        assert!(target.list::<Carrier>().is_empty());
        assert_eq!(
            target.slot_value(Slot::Parcels).expect("get"),
            Some(old_parcels.as_bytes().to_vec())
        );
        assert_eq!(
            target.slot_value(Slot::Suppliers).expect("get"),
            Some(b"[]".to_vec())
        );
    }
}
