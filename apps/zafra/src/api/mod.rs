//! # Zafra HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Backend and record counts
//! - `GET|POST /parcels`, `PUT|DELETE /parcels/{id}` (same for `/suppliers`, `/carriers`)
//! - `GET|POST /freight`, `DELETE /freight/{id}` (same for `/transactions`)
//! - `GET|POST /harvest`, `DELETE /harvest/{id}`, `GET /harvest/products`
//! - `GET /totals/freight`, `/totals/transactions`, `/totals/harvest`
//! - `POST /export` - Export table of a collection or aggregate
//! - `GET /backup` - Whole-ledger backup archive (base64) with BLAKE3 digest
//!
//! Collection listings accept `?q=` for substring search; `/harvest` accepts
//! `parcel_id`, `supplier_id`, `carrier_id` and `product`.
//!
//! ## Security Configuration
//!
//! See `HttpSettings`: API key, rate limit and CORS origins come from
//! `zafra.toml` and the `ZAFRA_*` environment variables.

mod auth;
mod handlers;
mod middleware;
mod types;

pub use handlers::Creatable;
pub use middleware::{GlobalRateLimiter, create_rate_limiter};
pub use types::{
    BackupResponse, BoundedText, ExportRequest, HarvestQuery, HealthResponse, MutationResponse,
    SearchQuery, StatusResponse,
};

use crate::config::HttpSettings;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use zafra_core::{
    Carrier, FreightRecord, HarvestIntake, LandParcel, Ledger, LedgerError, Supplier, Transaction,
};

/// Maximum request body size (2 MB).
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the ledger.
#[derive(Clone)]
pub struct AppState {
    /// The ledger behind every endpoint.
    pub ledger: Arc<RwLock<Ledger>>,
    /// Authentication, rate limit and CORS settings.
    pub settings: Arc<HttpSettings>,
}

impl AppState {
    /// State with open settings: no API key, no rate limit.
    #[must_use]
    pub fn new(ledger: Ledger) -> Self {
        Self::with_settings(ledger, HttpSettings::open())
    }

    #[must_use]
    pub fn with_settings(ledger: Ledger, settings: HttpSettings) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            settings: Arc::new(settings),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const CORS_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// Build the CORS layer from the configured origins.
///
/// - `*`: any origin
/// - unset: localhost only
/// - otherwise: a comma-separated list of origins
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins {
        Some("*") => {
            tracing::warn!("CORS: allowing ALL origins. This is insecure for production!");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed.is_empty() {
                tracing::warn!("CORS: no valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed)
                    .allow_methods(CORS_METHODS)
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => build_localhost_cors(),
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|origin| origin.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(CORS_METHODS)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting (if enabled)
/// 5. Authentication (if an API key is configured)
pub fn create_router(state: AppState) -> Router {
    let settings = Arc::clone(&state.settings);

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        // Editable collections
        .route(
            "/parcels",
            get(handlers::list_records::<LandParcel>).post(handlers::create_record::<LandParcel>),
        )
        .route(
            "/parcels/{id}",
            put(handlers::update_record::<LandParcel>)
                .delete(handlers::remove_record::<LandParcel>),
        )
        .route(
            "/suppliers",
            get(handlers::list_records::<Supplier>).post(handlers::create_record::<Supplier>),
        )
        .route(
            "/suppliers/{id}",
            put(handlers::update_record::<Supplier>).delete(handlers::remove_record::<Supplier>),
        )
        .route(
            "/carriers",
            get(handlers::list_records::<Carrier>).post(handlers::create_record::<Carrier>),
        )
        .route(
            "/carriers/{id}",
            put(handlers::update_record::<Carrier>).delete(handlers::remove_record::<Carrier>),
        )
        // Linked collections
        .route(
            "/freight",
            get(handlers::list_records::<FreightRecord>)
                .post(handlers::create_record::<FreightRecord>),
        )
        .route(
            "/freight/{id}",
            delete(handlers::remove_record::<FreightRecord>),
        )
        .route(
            "/transactions",
            get(handlers::list_records::<Transaction>)
                .post(handlers::create_record::<Transaction>),
        )
        .route(
            "/transactions/{id}",
            delete(handlers::remove_record::<Transaction>),
        )
        .route(
            "/harvest",
            get(handlers::harvest_list_handler).post(handlers::create_record::<HarvestIntake>),
        )
        .route("/harvest/products", get(handlers::harvest_products_handler))
        .route(
            "/harvest/{id}",
            delete(handlers::remove_record::<HarvestIntake>),
        )
        // Views
        .route("/totals/freight", get(handlers::freight_totals_handler))
        .route("/totals/transactions", get(handlers::transaction_totals_handler))
        .route("/totals/harvest", get(handlers::harvest_totals_handler))
        .route("/export", post(handlers::export_handler))
        .route("/backup", get(handlers::backup_handler));

    // Authentication (innermost - runs last on request)
    match settings.api_key.as_deref() {
        Some(key) => {
            tracing::info!("API key authentication enabled");
            let expected: Arc<str> = Arc::from(key);
            router = router.layer(axum_middleware::from_fn_with_state(
                expected,
                auth::api_key_auth_middleware,
            ));
        }
        None => {
            tracing::warn!(
                "API key authentication DISABLED - all endpoints are publicly accessible! \
                 Set ZAFRA_API_KEY to enable authentication."
            );
        }
    }

    match create_rate_limiter(settings.rate_limit) {
        Some(limiter) => {
            tracing::info!("Rate limiting enabled: {} requests/second", settings.rate_limit);
            router = router.layer(axum_middleware::from_fn_with_state(
                limiter,
                middleware::rate_limit_middleware,
            ));
        }
        None => tracing::info!("Rate limiting disabled"),
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(settings.cors_origins.as_deref()))
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, ledger: Ledger, settings: HttpSettings) -> Result<(), LedgerError> {
    let state = AppState::with_settings(ledger, settings);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| LedgerError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Zafra HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| LedgerError::IoError(format!("Server error: {}", e)))
}
