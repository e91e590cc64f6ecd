//! # API Endpoint Handlers
//!
//! Collection endpoints are generic over the record kind; the router
//! instantiates them once per collection.

use super::{
    AppState,
    types::{
        BackupResponse, BoundedText, ExportRequest, HarvestQuery, HealthResponse,
        MutationResponse, SearchQuery, StatusResponse,
    },
};
use crate::report;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use base64::Engine;
use serde::Serialize;
use serde::de::DeserializeOwned;
use zafra_core::{
    Carrier, CarrierDraft, Editable, FreightDraft, FreightRecord, HarvestDraft, HarvestIntake,
    LandParcel, Ledger, LedgerCollection, LedgerError, ParcelDraft, Record, RecordId, Searchable,
    Supplier, SupplierDraft, Transaction, TransactionDraft, formats::archive_digest,
};

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// HTTP status for a ledger error: input problems are the client's, the rest
/// are the server's.
fn status_for(error: &LedgerError) -> StatusCode {
    match error {
        LedgerError::InvalidRecord(_)
        | LedgerError::Parse { .. }
        | LedgerError::DeserializationError(_) => StatusCode::BAD_REQUEST,
        LedgerError::SerializationError(_) | LedgerError::IoError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(error: &LedgerError) -> Response {
    (status_for(error), Json(MutationResponse::error(error.to_string()))).into_response()
}

fn not_found(kind: &str, id: u64) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(MutationResponse::error(format!("{} {} not found", kind, id))),
    )
        .into_response()
}

// =============================================================================
// CREATION
// =============================================================================

/// A record kind that can be created from a request body.
///
/// Freight and transactions go through the ledger's typed adds so the parent
/// name is resolved and frozen at creation.
pub trait Creatable: LedgerCollection + Serialize + Send + Sync + 'static {
    /// Request body.
    type Input: DeserializeOwned + BoundedText + Send + 'static;

    fn create(ledger: &mut Ledger, input: Self::Input) -> Result<Self, LedgerError>;
}

impl Creatable for LandParcel {
    type Input = ParcelDraft;

    fn create(ledger: &mut Ledger, input: ParcelDraft) -> Result<Self, LedgerError> {
        ledger.add_parcel(input)
    }
}

impl Creatable for Supplier {
    type Input = SupplierDraft;

    fn create(ledger: &mut Ledger, input: SupplierDraft) -> Result<Self, LedgerError> {
        ledger.add_supplier(input)
    }
}

impl Creatable for Carrier {
    type Input = CarrierDraft;

    fn create(ledger: &mut Ledger, input: CarrierDraft) -> Result<Self, LedgerError> {
        ledger.add_carrier(input)
    }
}

impl Creatable for FreightRecord {
    type Input = FreightDraft;

    fn create(ledger: &mut Ledger, input: FreightDraft) -> Result<Self, LedgerError> {
        ledger.add_freight(input)
    }
}

impl Creatable for Transaction {
    type Input = TransactionDraft;

    fn create(ledger: &mut Ledger, input: TransactionDraft) -> Result<Self, LedgerError> {
        ledger.add_transaction(input)
    }
}

impl Creatable for HarvestIntake {
    type Input = HarvestDraft;

    fn create(ledger: &mut Ledger, input: HarvestDraft) -> Result<Self, LedgerError> {
        ledger.add_harvest(input)
    }
}

// =============================================================================
// HEALTH / STATUS
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Backend name and record counts.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    Json(StatusResponse::new(ledger.backend_name(), ledger.counts()))
}

// =============================================================================
// COLLECTION HANDLERS
// =============================================================================

/// List a collection, narrowed by `?q=`.
pub async fn list_records<T>(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Response
where
    T: LedgerCollection + Searchable + Serialize + Send + Sync + 'static,
{
    let term = match query.term() {
        Ok(term) => term,
        Err(e) => return error_response(&e),
    };
    let ledger = state.ledger.read().await;
    Json(ledger.search::<T>(term)).into_response()
}

/// Create a record from the request body.
pub async fn create_record<T: Creatable>(
    State(state): State<AppState>,
    Json(input): Json<T::Input>,
) -> Response {
    if let Err(e) = input.check_text() {
        return error_response(&e);
    }

    let mut ledger = state.ledger.write().await;
    match T::create(&mut ledger, input) {
        Ok(record) => {
            tracing::info!(kind = T::KIND, id = %record.id(), "record created");
            (StatusCode::CREATED, Json(MutationResponse::success(record.id()))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// Replace a record, keeping its id and position.
pub async fn update_record<T>(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(draft): Json<T::Draft>,
) -> Response
where
    T: LedgerCollection + Editable + Send + Sync + 'static,
    T::Draft: DeserializeOwned + BoundedText + Send + 'static,
{
    if let Err(e) = draft.check_text() {
        return error_response(&e);
    }

    let mut ledger = state.ledger.write().await;
    match ledger.update::<T>(RecordId(id), draft) {
        Ok(true) => Json(MutationResponse::success(RecordId(id))).into_response(),
        Ok(false) => not_found(T::KIND, id),
        Err(e) => error_response(&e),
    }
}

/// Delete a record. Dependent records are kept.
pub async fn remove_record<T>(State(state): State<AppState>, Path(id): Path<u64>) -> Response
where
    T: LedgerCollection + Send + Sync + 'static,
{
    let mut ledger = state.ledger.write().await;
    if ledger.remove::<T>(RecordId(id)) {
        Json(MutationResponse::success(RecordId(id))).into_response()
    } else {
        not_found(T::KIND, id)
    }
}

// =============================================================================
// HARVEST HANDLERS
// =============================================================================

/// Harvest intakes narrowed by parcel, supplier, carrier and product.
pub async fn harvest_list_handler(
    State(state): State<AppState>,
    Query(query): Query<HarvestQuery>,
) -> Response {
    let filter = match query.to_filter() {
        Ok(filter) => filter,
        Err(e) => return error_response(&e),
    };
    let ledger = state.ledger.read().await;
    Json(ledger.harvest_filtered(&filter)).into_response()
}

/// Distinct harvest products, for the product filter.
pub async fn harvest_products_handler(State(state): State<AppState>) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    Json(ledger.harvest_products())
}

// =============================================================================
// TOTALS HANDLERS
// =============================================================================

pub async fn freight_totals_handler(State(state): State<AppState>) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    Json(ledger.freight_totals())
}

pub async fn transaction_totals_handler(State(state): State<AppState>) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    Json(ledger.transaction_totals())
}

/// Grand total over every intake; listing filters do not apply.
pub async fn harvest_totals_handler(State(state): State<AppState>) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    Json(ledger.harvest_totals())
}

// =============================================================================
// EXPORT / BACKUP
// =============================================================================

/// Export table of a collection or aggregate.
pub async fn export_handler(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Response {
    let scope = match request.scope() {
        Ok(scope) => scope,
        Err(e) => return error_response(&e),
    };

    let ledger = state.ledger.read().await;
    match report::build_table(&ledger, request.kind, &scope) {
        Ok(table) => Json(table).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Whole-ledger backup archive, base64-encoded, with its BLAKE3 digest.
pub async fn backup_handler(State(state): State<AppState>) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    match ledger.backup() {
        Ok(bytes) => {
            let data = base64::engine::general_purpose::STANDARD.encode(&bytes);
            (
                StatusCode::OK,
                Json(BackupResponse::success(data, archive_digest(&bytes))),
            )
        }
        Err(e) => (
            status_for(&e),
            Json(BackupResponse::error(format!("Backup failed: {}", e))),
        ),
    }
}
