//! # Ledger Records
//!
//! The six record shapes and their drafts (the record minus its id).
//!
//! Field names serialize in camelCase and are the persisted slot contract:
//! renaming a field breaks every stored snapshot.
//!
//! | Record | Editable | Parents |
//! |---|---|---|
//! | `LandParcel` | yes | - |
//! | `Supplier` | yes | - |
//! | `Carrier` | yes | - |
//! | `FreightRecord` | no | `Carrier` (name frozen) |
//! | `Transaction` | no | `Supplier` (name frozen) |
//! | `HarvestIntake` | no | `LandParcel`, `Supplier`, `Carrier` (ids only) |

use crate::derivation::{freight_rate_per_ton, vat_breakdown};
use crate::numeric::nullable_f64;
use crate::resolver::{Linked, Named};
use crate::store::Editable;
use crate::{LedgerError, Record, RecordId, Slot};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// LAND PARCEL
// =============================================================================

/// A managed land unit under cultivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandParcel {
    pub id: RecordId,
    pub name: String,
    pub tenant: String,
    pub location: String,
    pub partnership: String,
    pub company: String,
    #[serde(deserialize_with = "nullable_f64")]
    pub area_hectares: f64,
    pub policy_numbers: String,
}

/// A land parcel without its id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParcelDraft {
    pub name: String,
    pub tenant: String,
    pub location: String,
    pub partnership: String,
    pub company: String,
    pub area_hectares: f64,
    pub policy_numbers: String,
}

impl Record for LandParcel {
    type Draft = ParcelDraft;
    const SLOT: Slot = Slot::Parcels;

    fn id(&self) -> RecordId {
        self.id
    }

    fn assemble(id: RecordId, draft: ParcelDraft) -> Self {
        Self {
            id,
            name: draft.name,
            tenant: draft.tenant,
            location: draft.location,
            partnership: draft.partnership,
            company: draft.company,
            area_hectares: draft.area_hectares,
            policy_numbers: draft.policy_numbers,
        }
    }
}

impl Editable for LandParcel {}

impl Named for LandParcel {
    fn name(&self) -> &str {
        &self.name
    }
}

// =============================================================================
// SUPPLIER
// =============================================================================

/// Category of a supplier.
///
/// Reads the original Spanish labels as aliases; a missing value reads as
/// `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SupplierType {
    #[serde(alias = "Insumos")]
    Supplies,
    #[serde(alias = "Servicios")]
    Services,
    #[serde(alias = "Transporte")]
    Transport,
    #[default]
    #[serde(alias = "Otro")]
    Other,
}

impl SupplierType {
    /// Display label of this category.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Supplies => "Supplies",
            Self::Services => "Services",
            Self::Transport => "Transport",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for SupplierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SupplierType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "supplies" | "insumos" => Ok(Self::Supplies),
            "services" | "servicios" => Ok(Self::Services),
            "transport" | "transporte" => Ok(Self::Transport),
            "other" | "otro" => Ok(Self::Other),
            _ => Err(LedgerError::InvalidRecord(format!(
                "Unknown supplier type '{}'. Use: supplies, services, transport, other",
                s
            ))),
        }
    }
}

/// A counterparty that sells goods or services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: RecordId,
    pub name: String,
    pub location: String,
    pub tax_id: String,
    pub phone: String,
    pub bank_account: String,
    #[serde(rename = "type", default)]
    pub kind: SupplierType,
}

/// A supplier without its id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupplierDraft {
    pub name: String,
    pub location: String,
    pub tax_id: String,
    pub phone: String,
    pub bank_account: String,
    #[serde(rename = "type")]
    pub kind: SupplierType,
}

impl Record for Supplier {
    type Draft = SupplierDraft;
    const SLOT: Slot = Slot::Suppliers;

    fn id(&self) -> RecordId {
        self.id
    }

    fn assemble(id: RecordId, draft: SupplierDraft) -> Self {
        Self {
            id,
            name: draft.name,
            location: draft.location,
            tax_id: draft.tax_id,
            phone: draft.phone,
            bank_account: draft.bank_account,
            kind: draft.kind,
        }
    }
}

impl Editable for Supplier {}

impl Named for Supplier {
    fn name(&self) -> &str {
        &self.name
    }
}

// =============================================================================
// CARRIER
// =============================================================================

/// An entity operating vehicles that move goods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Carrier {
    pub id: RecordId,
    pub name: String,
    pub plate: String,
    pub phone: String,
    pub company: String,
}

/// A carrier without its id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarrierDraft {
    pub name: String,
    pub plate: String,
    pub phone: String,
    pub company: String,
}

impl Record for Carrier {
    type Draft = CarrierDraft;
    const SLOT: Slot = Slot::Carriers;

    fn id(&self) -> RecordId {
        self.id
    }

    fn assemble(id: RecordId, draft: CarrierDraft) -> Self {
        Self {
            id,
            name: draft.name,
            plate: draft.plate,
            phone: draft.phone,
            company: draft.company,
        }
    }
}

impl Editable for Carrier {}

impl Named for Carrier {
    fn name(&self) -> &str {
        &self.name
    }
}

// =============================================================================
// FREIGHT RECORD
// =============================================================================

/// One priced trip attributable to a carrier.
///
/// `rate_per_ton` literally stores `distance_km * rate_per_km`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreightRecord {
    pub id: RecordId,
    pub product: String,
    #[serde(deserialize_with = "nullable_f64")]
    pub distance_km: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub rate_per_km: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub rate_per_ton: f64,
    pub date: String,
    pub carrier_id: RecordId,
    #[serde(default)]
    pub carrier_name: Option<String>,
}

/// A freight trip as entered, before the carrier name is frozen onto it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FreightDraft {
    pub product: String,
    pub distance_km: f64,
    pub rate_per_km: f64,
    pub date: String,
    pub carrier_id: RecordId,
}

impl Record for FreightRecord {
    type Draft = Linked<FreightDraft>;
    const SLOT: Slot = Slot::Freight;

    fn id(&self) -> RecordId {
        self.id
    }

    fn assemble(id: RecordId, linked: Linked<FreightDraft>) -> Self {
        let Linked { draft, parent_name } = linked;
        Self {
            id,
            rate_per_ton: freight_rate_per_ton(draft.distance_km, draft.rate_per_km),
            product: draft.product,
            distance_km: draft.distance_km,
            rate_per_km: draft.rate_per_km,
            date: draft.date,
            carrier_id: draft.carrier_id,
            carrier_name: parent_name,
        }
    }
}

// =============================================================================
// TRANSACTION
// =============================================================================

/// A payment or credit booked against a supplier.
///
/// `vat_amount` and `total` are computed once at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: RecordId,
    pub supplier_id: RecordId,
    #[serde(default)]
    pub supplier_name: Option<String>,
    pub date: String,
    #[serde(deserialize_with = "nullable_f64")]
    pub payments: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub credits: f64,
    pub description: String,
    pub buyer_name: String,
    #[serde(rename = "hasVAT", default)]
    pub has_vat: bool,
    #[serde(deserialize_with = "nullable_f64")]
    pub vat_amount: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub total: f64,
}

/// A transaction as entered, before the supplier name is frozen onto it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionDraft {
    pub supplier_id: RecordId,
    pub date: String,
    pub payments: f64,
    pub credits: f64,
    pub description: String,
    pub buyer_name: String,
    #[serde(rename = "hasVAT")]
    pub has_vat: bool,
}

impl Record for Transaction {
    type Draft = Linked<TransactionDraft>;
    const SLOT: Slot = Slot::Transactions;

    fn id(&self) -> RecordId {
        self.id
    }

    fn assemble(id: RecordId, linked: Linked<TransactionDraft>) -> Self {
        let Linked { draft, parent_name } = linked;
        let amounts = vat_breakdown(draft.payments, draft.credits, draft.has_vat);
        Self {
            id,
            supplier_id: draft.supplier_id,
            supplier_name: parent_name,
            date: draft.date,
            payments: draft.payments,
            credits: draft.credits,
            description: draft.description,
            buyer_name: draft.buyer_name,
            has_vat: draft.has_vat,
            vat_amount: amounts.vat_amount,
            total: amounts.total,
        }
    }
}

// =============================================================================
// HARVEST INTAKE
// =============================================================================

/// One weighed delivery of product linking a parcel, supplier and carrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestIntake {
    pub id: RecordId,
    pub parcel_id: RecordId,
    pub supplier_id: RecordId,
    pub carrier_id: RecordId,
    pub product: String,
    #[serde(deserialize_with = "nullable_f64")]
    pub humidity_pct: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub incoming_weight_kg: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub weight_discount_kg: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub final_weight_kg: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub initial_receipt_no: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub final_receipt_no: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub volatile_pct: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub foreign_matter_pct: f64,
}

/// A harvest intake without its id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HarvestDraft {
    pub parcel_id: RecordId,
    pub supplier_id: RecordId,
    pub carrier_id: RecordId,
    pub product: String,
    pub humidity_pct: f64,
    pub incoming_weight_kg: f64,
    pub weight_discount_kg: f64,
    pub final_weight_kg: f64,
    pub initial_receipt_no: f64,
    pub final_receipt_no: f64,
    pub volatile_pct: f64,
    pub foreign_matter_pct: f64,
}

impl Record for HarvestIntake {
    type Draft = HarvestDraft;
    const SLOT: Slot = Slot::HarvestIntake;

    fn id(&self) -> RecordId {
        self.id
    }

    fn assemble(id: RecordId, draft: HarvestDraft) -> Self {
        Self {
            id,
            parcel_id: draft.parcel_id,
            supplier_id: draft.supplier_id,
            carrier_id: draft.carrier_id,
            product: draft.product,
            humidity_pct: draft.humidity_pct,
            incoming_weight_kg: draft.incoming_weight_kg,
            weight_discount_kg: draft.weight_discount_kg,
            final_weight_kg: draft.final_weight_kg,
            initial_receipt_no: draft.initial_receipt_no,
            final_receipt_no: draft.final_receipt_no,
            volatile_pct: draft.volatile_pct,
            foreign_matter_pct: draft.foreign_matter_pct,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
