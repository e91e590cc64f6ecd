//! # Filter/Search Engine
//!
//! Two read-only views, recomputed on every call:
//! - Free-text search: case-insensitive substring match over a fixed field
//!   subset per record kind. An empty term matches everything.
//! - Harvest dimensions: exact equality on parcel, supplier, carrier and
//!   product, each optional, AND-combined.

use crate::{
    Carrier, FreightRecord, HarvestIntake, LandParcel, RecordId, Supplier, Transaction,
};

// =============================================================================
// TEXT SEARCH
// =============================================================================

/// A record that can be matched by free-text search.
pub trait Searchable {
    /// The fields the search term is matched against.
    fn search_fields(&self) -> Vec<&str>;

    /// Whether any search field contains `needle`, which must already be
    /// lowercase.
    fn matches_lowercase(&self, needle: &str) -> bool {
        self.search_fields()
            .into_iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

impl Searchable for LandParcel {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.tenant.as_str(), self.partnership.as_str()]
    }
}

impl Searchable for Supplier {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.location.as_str(), self.tax_id.as_str()]
    }
}

impl Searchable for Carrier {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.plate.as_str(), self.company.as_str()]
    }
}

impl Searchable for FreightRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.product.as_str(),
            self.carrier_name.as_deref().unwrap_or_default(),
        ]
    }
}

impl Searchable for Transaction {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.supplier_name.as_deref().unwrap_or_default(),
            self.description.as_str(),
            self.buyer_name.as_str(),
        ]
    }
}

/// Records whose search fields contain `term`, ignoring case.
///
/// Order is preserved. An empty term returns every record.
#[must_use]
pub fn filter_by_text<'a, T: Searchable>(records: &'a [T], term: &str) -> Vec<&'a T> {
    if term.is_empty() {
        return records.iter().collect();
    }
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|record| record.matches_lowercase(&needle))
        .collect()
}

// =============================================================================
// HARVEST DIMENSIONS
// =============================================================================

/// One filter dimension: either unconstrained or an exact value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Dimension<T> {
    #[default]
    Any,
    Exactly(T),
}

impl<T: PartialEq> Dimension<T> {
    /// Whether `value` passes this dimension.
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Self::Any => true,
            Self::Exactly(expected) => expected == value,
        }
    }
}

impl<T> From<Option<T>> for Dimension<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Any, Self::Exactly)
    }
}

/// The four harvest-intake dimensions. All default to `Any`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HarvestFilter {
    pub parcel: Dimension<RecordId>,
    pub supplier: Dimension<RecordId>,
    pub carrier: Dimension<RecordId>,
    pub product: Dimension<String>,
}

impl HarvestFilter {
    /// A filter that admits every intake.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn parcel(mut self, id: RecordId) -> Self {
        self.parcel = Dimension::Exactly(id);
        self
    }

    #[must_use]
    pub fn supplier(mut self, id: RecordId) -> Self {
        self.supplier = Dimension::Exactly(id);
        self
    }

    #[must_use]
    pub fn carrier(mut self, id: RecordId) -> Self {
        self.carrier = Dimension::Exactly(id);
        self
    }

    #[must_use]
    pub fn product(mut self, product: impl Into<String>) -> Self {
        self.product = Dimension::Exactly(product.into());
        self
    }

    /// Whether every dimension admits `intake`.
    #[must_use]
    pub fn matches(&self, intake: &HarvestIntake) -> bool {
        self.parcel.admits(&intake.parcel_id)
            && self.supplier.admits(&intake.supplier_id)
            && self.carrier.admits(&intake.carrier_id)
            && self.product.admits(&intake.product)
    }
}

/// Intakes admitted by every dimension of `filter`, in collection order.
#[must_use]
pub fn filter_by_dimensions<'a>(
    intakes: &'a [HarvestIntake],
    filter: &HarvestFilter,
) -> Vec<&'a HarvestIntake> {
    intakes.iter().filter(|i| filter.matches(i)).collect()
}

/// Distinct product names in first-seen order.
#[must_use]
pub fn distinct_products(intakes: &[HarvestIntake]) -> Vec<String> {
    let mut products: Vec<String> = Vec::new();
    for intake in intakes {
        if !products.iter().any(|p| p == &intake.product) {
            products.push(intake.product.clone());
        }
    }
    products
}

// =============================================================================
// TESTS
// =============================================================================
