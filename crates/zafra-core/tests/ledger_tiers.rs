//! # Ledger Tier Tests (T0-T4)
//!
//! End-to-end scenarios through the public API.
//!
//! ## Tiers
//! - T0: Store Integrity
//! - T1: Derivation and Name Freezing
//! - T2: Aggregation
//! - T3: Search and Filtering
//! - T4: Persistence Cycles

use std::sync::Arc;
use zafra_core::{
    Carrier, CarrierDraft, FixedClock, FreightDraft, FreightRecord, HarvestDraft, HarvestFilter,
    HarvestIntake, LandParcel, Ledger, LedgerError, MemorySlots, ParcelDraft, RecordId, Slot,
    Supplier, SupplierDraft, SupplierType, Transaction, TransactionDraft,
};

fn ledger_at(millis: u64) -> Ledger {
    Ledger::open_with_clock(Box::new(MemorySlots::new()), Arc::new(FixedClock(millis)))
}

fn carrier(name: &str) -> CarrierDraft {
    CarrierDraft {
        name: name.into(),
        ..CarrierDraft::default()
    }
}

fn supplier(name: &str) -> SupplierDraft {
    SupplierDraft {
        name: name.into(),
        ..SupplierDraft::default()
    }
}

fn parcel(name: &str) -> ParcelDraft {
    ParcelDraft {
        name: name.into(),
        ..ParcelDraft::default()
    }
}

fn freight(carrier_id: RecordId, km: f64, rate: f64) -> FreightDraft {
    FreightDraft {
        product: "Soja".into(),
        distance_km: km,
        rate_per_km: rate,
        date: "2024-03-01".into(),
        carrier_id,
    }
}

fn harvest(parcel: RecordId, supplier: RecordId, carrier: RecordId, product: &str) -> HarvestDraft {
    HarvestDraft {
        parcel_id: parcel,
        supplier_id: supplier,
        carrier_id: carrier,
        product: product.into(),
        incoming_weight_kg: 1000.0,
        final_weight_kg: 950.0,
        ..HarvestDraft::default()
    }
}

// =============================================================================
// TIER T0: STORE INTEGRITY
// =============================================================================

mod t0_store_integrity {
    use super::*;

    /// T0.1: add assigns the clock time as id and appends.
    #[test]
    fn add_uses_clock_id() {
        let mut ledger = ledger_at(1_710_000_000_000);
        let added = ledger.add_parcel(parcel("La Loma")).expect("add");

        assert_eq!(added.id, RecordId(1_710_000_000_000));
        assert_eq!(ledger.list::<LandParcel>(), &[added]);
    }

    /// T0.2: a sequence of adds, an update and a remove gives the expected list.
    #[test]
    fn mutation_sequence_gives_expected_list() {
        let mut ledger = ledger_at(100);
        let a = ledger.add_carrier(carrier("A")).expect("add");
        let b = ledger.add_carrier(carrier("B")).expect("add");
        let c = ledger.add_carrier(carrier("C")).expect("add");

        assert!(ledger.update::<Carrier>(b.id, carrier("B2")).expect("update"));
        assert!(ledger.remove::<Carrier>(a.id));

        let names: Vec<_> = ledger.list::<Carrier>().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["B2", "C"]);
        assert_eq!(ledger.list::<Carrier>()[1].id, c.id);
    }

    /// T0.3: removing an unknown id leaves the collection byte-identical.
    #[test]
    fn remove_unknown_is_byte_identical() {
        let mut ledger = ledger_at(100);
        ledger.add_supplier(supplier("Agroindustrias XYZ")).expect("add");
        let before = serde_json::to_vec(ledger.list::<Supplier>()).expect("serialize");

        assert!(!ledger.remove::<Supplier>(RecordId(1)));

        let after = serde_json::to_vec(ledger.list::<Supplier>()).expect("serialize");
        assert_eq!(before, after);
    }

    /// T0.4: load replaces and list returns exactly the snapshot.
    #[test]
    fn load_then_list_is_identity() {
        let mut source = ledger_at(5);
        source.add_carrier(carrier("X")).expect("add");
        source.add_carrier(carrier("Y")).expect("add");
        let snapshot = source.list::<Carrier>().to_vec();

        let mut target = ledger_at(9);
        target.add_carrier(carrier("old")).expect("add");
        target.load(snapshot.clone());

        assert_eq!(target.list::<Carrier>(), snapshot.as_slice());
    }

    /// T0.5: required fields are enforced by the facade.
    #[test]
    fn required_fields_enforced() {
        let mut ledger = ledger_at(1);
        assert!(matches!(
            ledger.add_supplier(supplier("")),
            Err(LedgerError::InvalidRecord(_))
        ));
        assert!(matches!(
            ledger.add_freight(freight(RecordId::UNSET, 1.0, 1.0)),
            Err(LedgerError::InvalidRecord(_))
        ));
        assert!(matches!(
            ledger.add_transaction(TransactionDraft::default()),
            Err(LedgerError::InvalidRecord(_))
        ));
        assert_eq!(ledger.counts().total(), 0);
    }

    /// T0.6: removing a parent leaves dependents in place.
    #[test]
    fn no_cascade_on_parent_removal() {
        let mut ledger = ledger_at(1);
        let c = ledger.add_carrier(carrier("Transportes Sur")).expect("add");
        ledger.add_freight(freight(c.id, 10.0, 1.0)).expect("add");

        assert!(ledger.remove::<Carrier>(c.id));

        let trips = ledger.list::<FreightRecord>();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].carrier_name.as_deref(), Some("Transportes Sur"));
    }
}

// =============================================================================
// TIER T1: DERIVATION AND NAME FREEZING
// =============================================================================

mod t1_derivation {
    use super::*;

    /// T1.1: VAT and total are derived once at creation.
    #[test]
    fn vat_example() {
        let mut ledger = ledger_at(1);
        let s = ledger.add_supplier(supplier("Agroindustrias XYZ")).expect("add");

        let with_vat = ledger
            .add_transaction(TransactionDraft {
                supplier_id: s.id,
                credits: 10000.0,
                has_vat: true,
                ..TransactionDraft::default()
            })
            .expect("add");
        let without_vat = ledger
            .add_transaction(TransactionDraft {
                supplier_id: s.id,
                credits: 10000.0,
                has_vat: false,
                ..TransactionDraft::default()
            })
            .expect("add");

        assert_eq!(with_vat.vat_amount, 2200.0);
        assert_eq!(with_vat.total, 12200.0);
        assert_eq!(without_vat.vat_amount, 0.0);
        assert_eq!(without_vat.total, 10000.0);
    }

    /// T1.2: the supplier name is a creation-time snapshot.
    #[test]
    fn supplier_rename_does_not_propagate() {
        let mut ledger = ledger_at(1);
        let s = ledger.add_supplier(supplier("Old Name")).expect("add");
        ledger
            .add_transaction(TransactionDraft {
                supplier_id: s.id,
                credits: 1.0,
                ..TransactionDraft::default()
            })
            .expect("add");

        ledger
            .update::<Supplier>(
                s.id,
                SupplierDraft {
                    name: "New Name".into(),
                    kind: SupplierType::Services,
                    ..SupplierDraft::default()
                },
            )
            .expect("update");

        assert_eq!(
            ledger.list::<Transaction>()[0].supplier_name.as_deref(),
            Some("Old Name")
        );
        assert_eq!(ledger.list::<Supplier>()[0].kind, SupplierType::Services);
    }

    /// T1.3: non-numeric input flows through as NaN.
    #[test]
    fn nan_flows_through_derivation() {
        let mut ledger = ledger_at(1);
        let c = ledger.add_carrier(carrier("A")).expect("add");
        let trip = ledger
            .add_freight(freight(c.id, zafra_core::numeric::parse_lenient("lejos"), 2.0))
            .expect("add");
        assert!(trip.distance_km.is_nan());
        assert!(trip.rate_per_ton.is_nan());
    }
}

// =============================================================================
// TIER T2: AGGREGATION
// =============================================================================

mod t2_aggregation {
    use super::*;

    /// T2.1: grouped freight totals keep only carriers with activity.
    #[test]
    fn grouped_freight_example() {
        let mut ledger = ledger_at(1);
        let a = ledger.add_carrier(carrier("A")).expect("add");
        ledger.add_carrier(carrier("B")).expect("add");
        ledger.add_freight(freight(a.id, 100.0, 50.0)).expect("add");
        ledger.add_freight(freight(a.id, 200.0, 10.0)).expect("add");

        let rows = ledger.freight_totals();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].carrier_id, a.id);
        assert_eq!(rows[0].total_rate_per_ton, 7000.0);
        assert_eq!(rows[0].total_km, 300.0);
        assert_eq!(rows[0].total_rate_per_km, 60.0);
    }

    /// T2.2: grand totals ignore any active filter.
    #[test]
    fn grand_total_ignores_filters() {
        let mut ledger = ledger_at(1);
        let p = ledger.add_parcel(parcel("P")).expect("add");
        let s = ledger.add_supplier(supplier("S")).expect("add");
        let c = ledger.add_carrier(carrier("C")).expect("add");
        ledger.add_harvest(harvest(p.id, s.id, c.id, "Soja")).expect("add");
        ledger.add_harvest(harvest(p.id, s.id, c.id, "Maíz")).expect("add");

        let filtered = ledger.harvest_filtered(&HarvestFilter::any().product("Soja"));
        assert_eq!(filtered.len(), 1);

        let totals = ledger.harvest_totals();
        assert_eq!(totals.total_incoming_weight_kg, 2000.0);
        assert_eq!(totals.total_final_weight_kg, 1900.0);
    }

    /// T2.3: supplier balance combines payments, credits and VAT.
    #[test]
    fn supplier_balance() {
        let mut ledger = ledger_at(1);
        let s = ledger.add_supplier(supplier("S")).expect("add");
        ledger
            .add_transaction(TransactionDraft {
                supplier_id: s.id,
                payments: 1000.0,
                credits: 5000.0,
                has_vat: true,
                ..TransactionDraft::default()
            })
            .expect("add");

        let rows = ledger.transaction_totals();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_vat, 880.0);
        assert_eq!(rows[0].balance, 5000.0 - 1000.0 + 880.0);
    }
}

// =============================================================================
// TIER T3: SEARCH AND FILTERING
// =============================================================================

mod t3_filtering {
    use super::*;

    /// T3.1: case-insensitive substring search.
    #[test]
    fn search_example() {
        let mut ledger = ledger_at(1);
        ledger.add_supplier(supplier("Agroindustrias XYZ")).expect("add");
        ledger.add_supplier(supplier("Fletes Norte")).expect("add");

        let hits = ledger.search::<Supplier>("agr");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Agroindustrias XYZ");
        assert_eq!(ledger.search::<Supplier>("").len(), 2);
    }

    /// T3.2: all-Any returns everything, one dimension narrows exactly.
    #[test]
    fn harvest_dimensions() {
        let mut ledger = ledger_at(1);
        let p1 = ledger.add_parcel(parcel("P1")).expect("add");
        let p2 = ledger.add_parcel(parcel("P2")).expect("add");
        let s = ledger.add_supplier(supplier("S")).expect("add");
        let c = ledger.add_carrier(carrier("C")).expect("add");
        ledger.add_harvest(harvest(p1.id, s.id, c.id, "Soja")).expect("add");
        ledger.add_harvest(harvest(p2.id, s.id, c.id, "Soja")).expect("add");
        ledger.add_harvest(harvest(p1.id, s.id, c.id, "Maíz")).expect("add");

        assert_eq!(ledger.harvest_filtered(&HarvestFilter::any()).len(), 3);

        let by_parcel: Vec<&HarvestIntake> =
            ledger.harvest_filtered(&HarvestFilter::any().parcel(p2.id));
        assert_eq!(by_parcel.len(), 1);
        assert_eq!(by_parcel[0].parcel_id, p2.id);

        assert_eq!(ledger.harvest_products(), vec!["Soja", "Maíz"]);
    }
}

// =============================================================================
// TIER T4: PERSISTENCE CYCLES
// =============================================================================

mod t4_persistence {
    use super::*;
    use tempfile::tempdir;

    /// T4.1: a reopened redb ledger sees every committed mutation.
    #[test]
    fn redb_ledger_survives_reopen() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("zafra.redb");

        {
            let mut ledger = Ledger::with_redb(&path).expect("open");
            let c = ledger.add_carrier(carrier("Transportes Sur")).expect("add");
            ledger.add_freight(freight(c.id, 120.0, 3.0)).expect("add");
        }

        let ledger = Ledger::with_redb(&path).expect("reopen");
        assert_eq!(ledger.list::<Carrier>().len(), 1);
        assert_eq!(ledger.list::<FreightRecord>()[0].rate_per_ton, 360.0);
    }

    /// T4.2: save -> load -> save produces identical slot bytes.
    #[test]
    fn save_load_save_identical() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("zafra.redb");

        let first = {
            let mut ledger = Ledger::with_redb(&path).expect("open");
            ledger
                .add_parcel(ParcelDraft {
                    name: "La Loma".into(),
                    area_hectares: f64::NAN,
                    ..ParcelDraft::default()
                })
                .expect("add");
            ledger.slot_value(Slot::Parcels).expect("get")
        };

        let mut ledger = Ledger::with_redb(&path).expect("reopen");
        let snapshot = ledger.list::<LandParcel>().to_vec();
        let p = ledger.add_parcel(parcel("temp")).expect("add");
        ledger.remove::<LandParcel>(p.id);

        // NaN != NaN, so compare identity and the NaN flag field by field.
        let after = ledger.list::<LandParcel>();
        assert_eq!(after.len(), snapshot.len());
        for (a, b) in after.iter().zip(&snapshot) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.name, b.name);
            assert!(a.area_hectares.is_nan() && b.area_hectares.is_nan());
        }
        assert_eq!(ledger.slot_value(Slot::Parcels).expect("get"), first);
    }

    /// T4.3: a malformed slot opens as empty and is not rewritten.
    #[test]
    fn malformed_slot_opens_empty() {
        let slots = MemorySlots::with_values([("freight", "{oops")]);
        let ledger = Ledger::open(Box::new(slots));

        assert!(ledger.list::<FreightRecord>().is_empty());
        assert_eq!(
            ledger.slot_value(Slot::Freight).expect("get"),
            Some(b"{oops".to_vec())
        );
    }

    /// T4.4: JSON-file slots are plain arrays named after the slot.
    #[test]
    fn file_slots_layout() {
        let temp = tempdir().expect("temp dir");
        let mut ledger = Ledger::with_files(temp.path()).expect("open");
        let p = ledger.add_parcel(parcel("P")).expect("add");
        let s = ledger.add_supplier(supplier("S")).expect("add");
        let c = ledger.add_carrier(carrier("C")).expect("add");
        ledger.add_harvest(harvest(p.id, s.id, c.id, "Soja")).expect("add");

        let raw = std::fs::read_to_string(temp.path().join("harvest-intake.json")).expect("read");
        let parsed: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(parsed[0]["product"], "Soja");
        assert_eq!(parsed[0]["incomingWeightKg"], 1000.0);
    }

    /// T4.5: compacting a redb ledger keeps every collection.
    #[test]
    fn redb_compact_keeps_records() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("zafra.redb");

        {
            let mut ledger = Ledger::with_redb(&path).expect("open");
            for i in 0..20 {
                let c = ledger.add_carrier(carrier(&format!("C{}", i))).expect("add");
                ledger.remove::<Carrier>(c.id);
            }
            ledger.add_carrier(carrier("Kept")).expect("add");
            ledger.compact().expect("compact");
        }

        let ledger = Ledger::with_redb(&path).expect("reopen");
        assert_eq!(ledger.list::<Carrier>().len(), 1);
        assert_eq!(ledger.list::<Carrier>()[0].name, "Kept");
    }
}
