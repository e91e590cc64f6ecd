//! # Derived Amounts
//!
//! Formulas evaluated once, when a freight record or transaction is created.
//! Stored results are never recomputed, even if inputs or rates change later.
//!
//! ```text
//! freight.ratePerTon      = distanceKm * ratePerKm
//! transaction.baseAmount  = credits - payments
//! transaction.vatAmount   = hasVAT ? baseAmount * 0.22 : 0
//! transaction.total       = baseAmount + vatAmount
//! ```

use crate::primitives::VAT_RATE;

/// Freight "rate per ton" as recorded by the ledger.
///
/// This is distance times the per-km rate; the name is historical and the
/// formula is kept as-is so stored values stay comparable.
#[must_use]
pub fn freight_rate_per_ton(distance_km: f64, rate_per_km: f64) -> f64 {
    distance_km * rate_per_km
}

/// Amounts derived from a transaction's payments and credits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VatBreakdown {
    pub base_amount: f64,
    pub vat_amount: f64,
    pub total: f64,
}

/// Compute base, VAT and total for a transaction.
///
/// Without VAT the VAT amount is exactly zero, even when the base is NaN.
#[must_use]
pub fn vat_breakdown(payments: f64, credits: f64, has_vat: bool) -> VatBreakdown {
    let base_amount = credits - payments;
    let vat_amount = if has_vat { base_amount * VAT_RATE } else { 0.0 };
    VatBreakdown {
        base_amount,
        vat_amount,
        total: base_amount + vat_amount,
    }
}
