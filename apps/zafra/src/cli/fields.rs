//! # Record Field Arguments
//!
//! Command-line fields for each record kind, and their conversion to drafts.
//!
//! Every field is optional. `add` starts from an empty draft, `edit` starts
//! from the stored record; given fields overwrite the start value. Numbers are
//! taken as text and parsed with the session's `NumberPolicy`.

use clap::Args;
use std::str::FromStr;
use zafra_core::{
    Carrier, CarrierDraft, FreightDraft, HarvestDraft, HarvestFilter, LandParcel, LedgerError,
    ParcelDraft, RecordId, Supplier, SupplierDraft, SupplierType, TransactionDraft,
    numeric::{parse_lenient, parse_strict},
};

// =============================================================================
// NUMBER POLICY
// =============================================================================

/// How typed numbers are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumberPolicy {
    /// Reject partial numbers instead of reading them leniently.
    pub strict: bool,
}

impl NumberPolicy {
    /// Parse `input` for `field`.
    ///
    /// Lenient: the numeric prefix, NaN when there is none.
    pub fn parse(self, field: &str, input: &str) -> Result<f64, LedgerError> {
        if self.strict {
            parse_strict(field, input)
        } else {
            Ok(parse_lenient(input))
        }
    }

    fn overlay(self, target: &mut f64, field: &str, input: Option<&str>) -> Result<(), LedgerError> {
        if let Some(input) = input {
            *target = self.parse(field, input)?;
        }
        Ok(())
    }
}

fn overlay_text(target: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn overlay_id(target: &mut RecordId, value: Option<u64>) {
    if let Some(value) = value {
        *target = RecordId(value);
    }
}

// =============================================================================
// PARCELS
// =============================================================================

#[derive(Args, Debug, Clone, Default)]
pub struct ParcelArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub tenant: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub partnership: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    /// Area in hectares
    #[arg(long)]
    pub area: Option<String>,
    #[arg(long)]
    pub policy_numbers: Option<String>,
}

impl ParcelArgs {
    /// Overlay these fields on `base`.
    pub fn apply(self, mut base: ParcelDraft, numbers: NumberPolicy) -> Result<ParcelDraft, LedgerError> {
        numbers.overlay(&mut base.area_hectares, "area", self.area.as_deref())?;
        overlay_text(&mut base.name, self.name);
        overlay_text(&mut base.tenant, self.tenant);
        overlay_text(&mut base.location, self.location);
        overlay_text(&mut base.partnership, self.partnership);
        overlay_text(&mut base.company, self.company);
        overlay_text(&mut base.policy_numbers, self.policy_numbers);
        Ok(base)
    }
}

/// The editable contents of a stored parcel.
pub fn parcel_draft(parcel: &LandParcel) -> ParcelDraft {
    ParcelDraft {
        name: parcel.name.clone(),
        tenant: parcel.tenant.clone(),
        location: parcel.location.clone(),
        partnership: parcel.partnership.clone(),
        company: parcel.company.clone(),
        area_hectares: parcel.area_hectares,
        policy_numbers: parcel.policy_numbers.clone(),
    }
}

// =============================================================================
// SUPPLIERS
// =============================================================================

#[derive(Args, Debug, Clone, Default)]
pub struct SupplierArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub tax_id: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub bank_account: Option<String>,
    /// supplies, services, transport or other
    #[arg(long)]
    pub kind: Option<String>,
}

impl SupplierArgs {
    pub fn apply(self, mut base: SupplierDraft) -> Result<SupplierDraft, LedgerError> {
        if let Some(kind) = self.kind.as_deref() {
            base.kind = SupplierType::from_str(kind)?;
        }
        overlay_text(&mut base.name, self.name);
        overlay_text(&mut base.location, self.location);
        overlay_text(&mut base.tax_id, self.tax_id);
        overlay_text(&mut base.phone, self.phone);
        overlay_text(&mut base.bank_account, self.bank_account);
        Ok(base)
    }
}

pub fn supplier_draft(supplier: &Supplier) -> SupplierDraft {
    SupplierDraft {
        name: supplier.name.clone(),
        location: supplier.location.clone(),
        tax_id: supplier.tax_id.clone(),
        phone: supplier.phone.clone(),
        bank_account: supplier.bank_account.clone(),
        kind: supplier.kind,
    }
}

// =============================================================================
// CARRIERS
// =============================================================================

#[derive(Args, Debug, Clone, Default)]
pub struct CarrierArgs {
    #[arg(long)]
    pub name: Option<String>,
    /// License plate
    #[arg(long)]
    pub plate: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
}

impl CarrierArgs {
    pub fn apply(self, mut base: CarrierDraft) -> CarrierDraft {
        overlay_text(&mut base.name, self.name);
        overlay_text(&mut base.plate, self.plate);
        overlay_text(&mut base.phone, self.phone);
        overlay_text(&mut base.company, self.company);
        base
    }
}

pub fn carrier_draft(carrier: &Carrier) -> CarrierDraft {
    CarrierDraft {
        name: carrier.name.clone(),
        plate: carrier.plate.clone(),
        phone: carrier.phone.clone(),
        company: carrier.company.clone(),
    }
}

// =============================================================================
// FREIGHT
// =============================================================================

#[derive(Args, Debug, Clone, Default)]
pub struct FreightArgs {
    #[arg(long)]
    pub product: Option<String>,
    /// Distance in km
    #[arg(long)]
    pub distance: Option<String>,
    /// Rate per km
    #[arg(long)]
    pub rate: Option<String>,
    #[arg(long)]
    pub date: Option<String>,
    /// Carrier id
    #[arg(long)]
    pub carrier: Option<u64>,
}

impl FreightArgs {
    pub fn into_draft(self, numbers: NumberPolicy) -> Result<FreightDraft, LedgerError> {
        let mut draft = FreightDraft::default();
        numbers.overlay(&mut draft.distance_km, "distance", self.distance.as_deref())?;
        numbers.overlay(&mut draft.rate_per_km, "rate", self.rate.as_deref())?;
        overlay_text(&mut draft.product, self.product);
        overlay_text(&mut draft.date, self.date);
        overlay_id(&mut draft.carrier_id, self.carrier);
        Ok(draft)
    }
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

#[derive(Args, Debug, Clone, Default)]
pub struct TransactionArgs {
    /// Supplier id
    #[arg(long)]
    pub supplier: Option<u64>,
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub payments: Option<String>,
    #[arg(long)]
    pub credits: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub buyer: Option<String>,
    /// Apply VAT to the base amount
    #[arg(long)]
    pub vat: bool,
}

impl TransactionArgs {
    pub fn into_draft(self, numbers: NumberPolicy) -> Result<TransactionDraft, LedgerError> {
        let mut draft = TransactionDraft {
            has_vat: self.vat,
            ..TransactionDraft::default()
        };
        numbers.overlay(&mut draft.payments, "payments", self.payments.as_deref())?;
        numbers.overlay(&mut draft.credits, "credits", self.credits.as_deref())?;
        overlay_id(&mut draft.supplier_id, self.supplier);
        overlay_text(&mut draft.date, self.date);
        overlay_text(&mut draft.description, self.description);
        overlay_text(&mut draft.buyer_name, self.buyer);
        Ok(draft)
    }
}

// =============================================================================
// HARVEST INTAKE
// =============================================================================

#[derive(Args, Debug, Clone, Default)]
pub struct HarvestArgs {
    /// Parcel id
    #[arg(long)]
    pub parcel: Option<u64>,
    /// Supplier id
    #[arg(long)]
    pub supplier: Option<u64>,
    /// Carrier id
    #[arg(long)]
    pub carrier: Option<u64>,
    #[arg(long)]
    pub product: Option<String>,
    /// Humidity %
    #[arg(long)]
    pub humidity: Option<String>,
    /// Incoming weight in kg
    #[arg(long)]
    pub incoming: Option<String>,
    /// Weight discount in kg
    #[arg(long)]
    pub discount: Option<String>,
    /// Final weight in kg
    #[arg(long = "final")]
    pub final_weight: Option<String>,
    #[arg(long)]
    pub initial_receipt: Option<String>,
    #[arg(long)]
    pub final_receipt: Option<String>,
    /// Volatile %
    #[arg(long)]
    pub volatile: Option<String>,
    /// Foreign matter %
    #[arg(long)]
    pub foreign_matter: Option<String>,
}

impl HarvestArgs {
    pub fn into_draft(self, numbers: NumberPolicy) -> Result<HarvestDraft, LedgerError> {
        let mut d = HarvestDraft::default();
        numbers.overlay(&mut d.humidity_pct, "humidity", self.humidity.as_deref())?;
        numbers.overlay(&mut d.incoming_weight_kg, "incoming", self.incoming.as_deref())?;
        numbers.overlay(&mut d.weight_discount_kg, "discount", self.discount.as_deref())?;
        numbers.overlay(&mut d.final_weight_kg, "final", self.final_weight.as_deref())?;
        numbers.overlay(&mut d.initial_receipt_no, "initial-receipt", self.initial_receipt.as_deref())?;
        numbers.overlay(&mut d.final_receipt_no, "final-receipt", self.final_receipt.as_deref())?;
        numbers.overlay(&mut d.volatile_pct, "volatile", self.volatile.as_deref())?;
        numbers.overlay(&mut d.foreign_matter_pct, "foreign-matter", self.foreign_matter.as_deref())?;
        overlay_id(&mut d.parcel_id, self.parcel);
        overlay_id(&mut d.supplier_id, self.supplier);
        overlay_id(&mut d.carrier_id, self.carrier);
        overlay_text(&mut d.product, self.product);
        Ok(d)
    }
}

/// Harvest listing dimensions; omitted means any.
#[derive(Args, Debug, Clone, Default)]
pub struct HarvestDims {
    #[arg(long)]
    pub parcel: Option<u64>,
    #[arg(long)]
    pub supplier: Option<u64>,
    #[arg(long)]
    pub carrier: Option<u64>,
    #[arg(long)]
    pub product: Option<String>,
}

impl HarvestDims {
    #[must_use]
    pub fn to_filter(&self) -> HarvestFilter {
        HarvestFilter {
            parcel: self.parcel.map(RecordId).into(),
            supplier: self.supplier.map(RecordId).into(),
            carrier: self.carrier.map(RecordId).into(),
            product: self.product.clone().into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
