//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API. Record bodies
//! are the core drafts themselves (camelCase, every field optional).

use crate::report::{ReportKind, ReportScope};
use serde::{Deserialize, Serialize};
use zafra_core::{
    CarrierDraft, FreightDraft, HarvestDraft, HarvestFilter, LedgerCounts, LedgerError,
    ParcelDraft, RecordId, SupplierDraft, TransactionDraft,
    primitives::{MAX_SEARCH_TERM_LENGTH, MAX_TEXT_LENGTH},
};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Ledger status: backend and record counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub backend: String,
    pub parcels: usize,
    pub suppliers: usize,
    pub carriers: usize,
    pub freight: usize,
    pub transactions: usize,
    pub harvest: usize,
    pub total: usize,
}

impl StatusResponse {
    #[must_use]
    pub fn new(backend: &str, counts: LedgerCounts) -> Self {
        Self {
            backend: backend.to_string(),
            parcels: counts.parcels,
            suppliers: counts.suppliers,
            carriers: counts.carriers,
            freight: counts.freight,
            transactions: counts.transactions,
            harvest: counts.harvest,
            total: counts.total(),
        }
    }
}

// =============================================================================
// MUTATION RESPONSE
// =============================================================================

/// Result of a create, update or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MutationResponse {
    #[must_use]
    pub fn success(id: RecordId) -> Self {
        Self {
            success: true,
            id: Some(id.value()),
            error: None,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            id: None,
            error: Some(message.into()),
        }
    }
}

// =============================================================================
// QUERIES
// =============================================================================

/// `?q=` free-text search on a collection listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

impl SearchQuery {
    /// The search term, empty when absent.
    pub fn term(&self) -> Result<&str, LedgerError> {
        let term = self.q.as_deref().unwrap_or_default();
        check_search_term(term)?;
        Ok(term)
    }
}

/// Harvest listing dimensions. Absent means "any".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarvestQuery {
    pub parcel_id: Option<u64>,
    pub supplier_id: Option<u64>,
    pub carrier_id: Option<u64>,
    pub product: Option<String>,
}

impl HarvestQuery {
    /// Convert to a dimension filter.
    pub fn to_filter(&self) -> Result<HarvestFilter, LedgerError> {
        if let Some(product) = &self.product {
            check_search_term(product)?;
        }
        Ok(HarvestFilter {
            parcel: self.parcel_id.map(RecordId).into(),
            supplier: self.supplier_id.map(RecordId).into(),
            carrier: self.carrier_id.map(RecordId).into(),
            product: self.product.clone().into(),
        })
    }
}

/// Export request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    pub kind: ReportKind,
    #[serde(default)]
    pub q: Option<String>,
    /// Harvest dimensions, read only by the harvest report.
    #[serde(flatten)]
    pub harvest: HarvestQuery,
}

impl ExportRequest {
    /// Search term and harvest dimensions as a report scope.
    pub fn scope(&self) -> Result<ReportScope, LedgerError> {
        let search = SearchQuery { q: self.q.clone() };
        let term = search.term()?;
        Ok(ReportScope::search(term).with_harvest(self.harvest.to_filter()?))
    }
}

// =============================================================================
// BACKUP RESPONSE
// =============================================================================

/// Whole-ledger backup archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupResponse {
    pub success: bool,
    /// Base64-encoded archive bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// BLAKE3 hex digest of the archive bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BackupResponse {
    #[must_use]
    pub fn success(data: String, digest: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            digest: Some(digest),
            error: None,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            digest: None,
            error: Some(message.into()),
        }
    }
}

// =============================================================================
// INPUT LIMITS
// =============================================================================

fn check_search_term(term: &str) -> Result<(), LedgerError> {
    if term.len() > MAX_SEARCH_TERM_LENGTH {
        return Err(LedgerError::InvalidRecord(format!(
            "Search term exceeds maximum length of {} bytes",
            MAX_SEARCH_TERM_LENGTH
        )));
    }
    Ok(())
}

/// A request body whose free-text fields are length-limited.
pub trait BoundedText {
    /// Every free-text field, paired with its name.
    fn text_fields(&self) -> Vec<(&'static str, &str)>;

    /// Reject any field longer than `MAX_TEXT_LENGTH` bytes.
    fn check_text(&self) -> Result<(), LedgerError> {
        for (field, value) in self.text_fields() {
            if value.len() > MAX_TEXT_LENGTH {
                return Err(LedgerError::InvalidRecord(format!(
                    "{} exceeds maximum length of {} bytes",
                    field, MAX_TEXT_LENGTH
                )));
            }
        }
        Ok(())
    }
}

impl BoundedText for ParcelDraft {
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("name", self.name.as_str()),
            ("tenant", self.tenant.as_str()),
            ("location", self.location.as_str()),
            ("partnership", self.partnership.as_str()),
            ("company", self.company.as_str()),
            ("policyNumbers", self.policy_numbers.as_str()),
        ]
    }
}

impl BoundedText for SupplierDraft {
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("name", self.name.as_str()),
            ("location", self.location.as_str()),
            ("taxId", self.tax_id.as_str()),
            ("phone", self.phone.as_str()),
            ("bankAccount", self.bank_account.as_str()),
        ]
    }
}

impl BoundedText for CarrierDraft {
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("name", self.name.as_str()),
            ("plate", self.plate.as_str()),
            ("phone", self.phone.as_str()),
            ("company", self.company.as_str()),
        ]
    }
}

impl BoundedText for FreightDraft {
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("product", self.product.as_str()), ("date", self.date.as_str())]
    }
}

impl BoundedText for TransactionDraft {
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("date", self.date.as_str()),
            ("description", self.description.as_str()),
            ("buyerName", self.buyer_name.as_str()),
        ]
    }
}

impl BoundedText for HarvestDraft {
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("product", self.product.as_str())]
    }
}
