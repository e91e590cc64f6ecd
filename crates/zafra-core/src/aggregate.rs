//! # Aggregation Engine
//!
//! Read-only summaries over collections, recomputed on every call.
//!
//! Two shapes exist and are kept as separate named operations:
//!
//! | Operation | Scope | Rows |
//! |---|---|---|
//! | `freight_by_carrier` | grouped per carrier | one per carrier with activity |
//! | `transactions_by_supplier` | grouped per supplier | one per supplier with activity |
//! | `harvest_grand_total` | entire collection | exactly one |
//!
//! Grouped rows follow the parent collection's order. A row whose summed
//! fields are all exactly zero is dropped. NaN is not zero, so a NaN sum
//! keeps its row.
//!
//! The harvest grand total always covers the full collection, regardless of
//! any filter applied to the listing.

use crate::{Carrier, FreightRecord, HarvestIntake, RecordId, Supplier, Transaction};
use serde::Serialize;

// =============================================================================
// GROUPED: FREIGHT PER CARRIER
// =============================================================================

/// Freight sums for one carrier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierFreightTotals {
    pub carrier_id: RecordId,
    pub carrier_name: String,
    pub total_km: f64,
    pub total_rate_per_km: f64,
    pub total_rate_per_ton: f64,
}

impl CarrierFreightTotals {
    fn is_zero(&self) -> bool {
        self.total_km == 0.0 && self.total_rate_per_km == 0.0 && self.total_rate_per_ton == 0.0
    }
}

/// Sum freight per carrier, in carrier order.
///
/// Freight rows pointing at unknown carriers are not reported.
#[must_use]
pub fn freight_by_carrier(
    carriers: &[Carrier],
    freight: &[FreightRecord],
) -> Vec<CarrierFreightTotals> {
    carriers
        .iter()
        .map(|carrier| {
            let mut row = CarrierFreightTotals {
                carrier_id: carrier.id,
                carrier_name: carrier.name.clone(),
                total_km: 0.0,
                total_rate_per_km: 0.0,
                total_rate_per_ton: 0.0,
            };
            for trip in freight.iter().filter(|f| f.carrier_id == carrier.id) {
                row.total_km += trip.distance_km;
                row.total_rate_per_km += trip.rate_per_km;
                row.total_rate_per_ton += trip.rate_per_ton;
            }
            row
        })
        .filter(|row| !row.is_zero())
        .collect()
}

// =============================================================================
// GROUPED: TRANSACTIONS PER SUPPLIER
// =============================================================================

/// Transaction sums and running balance for one supplier.
///
/// `balance = total_credits - total_payments + total_vat`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierBalance {
    pub supplier_id: RecordId,
    pub supplier_name: String,
    pub total_payments: f64,
    pub total_credits: f64,
    pub total_vat: f64,
    pub balance: f64,
}

impl SupplierBalance {
    fn is_zero(&self) -> bool {
        self.total_payments == 0.0 && self.total_credits == 0.0 && self.total_vat == 0.0
    }
}

/// Sum transactions per supplier, in supplier order.
#[must_use]
pub fn transactions_by_supplier(
    suppliers: &[Supplier],
    transactions: &[Transaction],
) -> Vec<SupplierBalance> {
    suppliers
        .iter()
        .map(|supplier| {
            let (mut payments, mut credits, mut vat) = (0.0, 0.0, 0.0);
            for tx in transactions.iter().filter(|t| t.supplier_id == supplier.id) {
                payments += tx.payments;
                credits += tx.credits;
                vat += tx.vat_amount;
            }
            SupplierBalance {
                supplier_id: supplier.id,
                supplier_name: supplier.name.clone(),
                total_payments: payments,
                total_credits: credits,
                total_vat: vat,
                balance: credits - payments + vat,
            }
        })
        .filter(|row| !row.is_zero())
        .collect()
}

// =============================================================================
// GRAND TOTAL: HARVEST INTAKE
// =============================================================================

/// Sums of every numeric harvest-intake field over the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestTotals {
    pub total_humidity_pct: f64,
    pub total_incoming_weight_kg: f64,
    pub total_weight_discount_kg: f64,
    pub total_final_weight_kg: f64,
    pub total_initial_receipt_no: f64,
    pub total_final_receipt_no: f64,
    pub total_volatile_pct: f64,
    pub total_foreign_matter_pct: f64,
}

/// Sum the eight numeric fields of every intake. An empty collection gives
/// all zeros.
#[must_use]
pub fn harvest_grand_total(intakes: &[HarvestIntake]) -> HarvestTotals {
    intakes
        .iter()
        .fold(HarvestTotals::default(), |mut acc, intake| {
            acc.total_humidity_pct += intake.humidity_pct;
            acc.total_incoming_weight_kg += intake.incoming_weight_kg;
            acc.total_weight_discount_kg += intake.weight_discount_kg;
            acc.total_final_weight_kg += intake.final_weight_kg;
            acc.total_initial_receipt_no += intake.initial_receipt_no;
            acc.total_final_receipt_no += intake.final_receipt_no;
            acc.total_volatile_pct += intake.volatile_pct;
            acc.total_foreign_matter_pct += intake.foreign_matter_pct;
            acc
        })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CarrierDraft, FreightDraft, HarvestDraft, Linked, Record, SupplierDraft, TransactionDraft,
    };

    fn carrier(id: u64, name: &str) -> Carrier {
        Carrier::assemble(
            RecordId(id),
            CarrierDraft {
                name: name.into(),
                ..CarrierDraft::default()
            },
        )
    }

    fn trip(id: u64, carrier_id: u64, km: f64, rate: f64) -> FreightRecord {
        FreightRecord::assemble(
            RecordId(id),
            Linked::new(
                FreightDraft {
                    product: "Soja".into(),
                    distance_km: km,
                    rate_per_km: rate,
                    carrier_id: RecordId(carrier_id),
                    ..FreightDraft::default()
                },
                None,
            ),
        )
    }

    fn supplier(id: u64, name: &str) -> Supplier {
        Supplier::assemble(
            RecordId(id),
            SupplierDraft {
                name: name.into(),
                ..SupplierDraft::default()
            },
        )
    }

    fn tx(id: u64, supplier_id: u64, payments: f64, credits: f64, has_vat: bool) -> Transaction {
        Transaction::assemble(
            RecordId(id),
            Linked::new(
                TransactionDraft {
                    supplier_id: RecordId(supplier_id),
                    payments,
                    credits,
                    has_vat,
                    ..TransactionDraft::default()
                },
                None,
            ),
        )
    }

    #[test]
    fn freight_grouped_drops_idle_carrier() {
        let carriers = vec![carrier(1, "A"), carrier(2, "B")];
        let freight = vec![trip(10, 1, 100.0, 50.0), trip(11, 1, 200.0, 10.0)];

        let rows = freight_by_carrier(&carriers, &freight);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].carrier_name, "A");
        assert_eq!(rows[0].total_km, 300.0);
        assert_eq!(rows[0].total_rate_per_km, 60.0);
        assert_eq!(rows[0].total_rate_per_ton, 7000.0);
    }

    #[test]
    fn freight_rows_follow_carrier_order() {
        let carriers = vec![carrier(2, "B"), carrier(1, "A")];
        let freight = vec![trip(10, 1, 1.0, 1.0), trip(11, 2, 1.0, 1.0)];

        let names: Vec<_> = freight_by_carrier(&carriers, &freight)
            .into_iter()
            .map(|r| r.carrier_name)
            .collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn orphan_freight_is_not_reported() {
        let carriers = vec![carrier(1, "A")];
        let freight = vec![trip(10, 99, 100.0, 1.0)];
        assert!(freight_by_carrier(&carriers, &freight).is_empty());
    }

    #[test]
    fn nan_sum_keeps_row() {
        let carriers = vec![carrier(1, "A")];
        let freight = vec![trip(10, 1, f64::NAN, 1.0)];
        let rows = freight_by_carrier(&carriers, &freight);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].total_km.is_nan());
    }

    #[test]
    fn supplier_balance_includes_vat() {
        let suppliers = vec![supplier(1, "Agroindustrias XYZ"), supplier(2, "Idle")];
        let transactions = vec![tx(10, 1, 0.0, 10000.0, true), tx(11, 1, 4000.0, 0.0, false)];

        let rows = transactions_by_supplier(&suppliers, &transactions);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.total_payments, 4000.0);
        assert_eq!(row.total_credits, 10000.0);
        assert_eq!(row.total_vat, 2200.0);
        assert_eq!(row.balance, 10000.0 - 4000.0 + 2200.0);
    }

    #[test]
    fn harvest_grand_total_sums_every_field() {
        let intakes: Vec<HarvestIntake> = (1..=3)
            .map(|i| {
                HarvestIntake::assemble(
                    RecordId(i),
                    HarvestDraft {
                        humidity_pct: 10.0,
                        incoming_weight_kg: 1000.0,
                        weight_discount_kg: 50.0,
                        final_weight_kg: 950.0,
                        initial_receipt_no: 1.0,
                        final_receipt_no: 2.0,
                        volatile_pct: 0.5,
                        foreign_matter_pct: 0.25,
                        ..HarvestDraft::default()
                    },
                )
            })
            .collect();

        let totals = harvest_grand_total(&intakes);

        assert_eq!(totals.total_humidity_pct, 30.0);
        assert_eq!(totals.total_incoming_weight_kg, 3000.0);
        assert_eq!(totals.total_weight_discount_kg, 150.0);
        assert_eq!(totals.total_final_weight_kg, 2850.0);
        assert_eq!(totals.total_initial_receipt_no, 3.0);
        assert_eq!(totals.total_final_receipt_no, 6.0);
        assert_eq!(totals.total_volatile_pct, 1.5);
        assert_eq!(totals.total_foreign_matter_pct, 0.75);
    }

    #[test]
    fn empty_harvest_total_is_zero() {
        assert_eq!(harvest_grand_total(&[]), HarvestTotals::default());
    }
}
