//! Defines routes for both services.
//!
//! ## Front door
//! - `PUT /clients/{client_id}/upload-document` — multipart upload
//! - `GET /clients/{client_id}/documents/{document_id}` — scoped retrieval
//! - `GET /health` — own status plus metadata store reachability
//!
//! ## Metadata store
//! - `POST /clients/{client_id}/documents` — create a record
//! - `GET  /clients/{client_id}/documents/{document_id}` — scoped lookup
//! - `GET  /health` — liveness
//! - `GET  /readyz` — SQLite readiness

use crate::{
    handlers::{
        document_handlers::{retrieve_document, upload_document},
        health_handlers::{api_health, store_health, store_readyz},
        store_handlers::{create_document, get_document},
    },
    services::{ingest_service::IngestService, metadata_store::MetadataStore},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

/// Allowance for multipart boundaries and part headers on top of the
/// configured upload ceiling.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Front door routes, carrying `IngestService` as shared state.
pub fn api_routes() -> Router<IngestService> {
    Router::new()
        .route("/health", get(api_health))
        .route("/clients/{client_id}/upload-document", put(upload_document))
        .route(
            "/clients/{client_id}/documents/{document_id}",
            get(retrieve_document),
        )
}

/// Metadata store routes, carrying `MetadataStore` as shared state.
pub fn store_routes() -> Router<MetadataStore> {
    Router::new()
        .route("/health", get(store_health))
        .route("/readyz", get(store_readyz))
        .route("/clients/{client_id}/documents", post(create_document))
        .route(
            "/clients/{client_id}/documents/{document_id}",
            get(get_document),
        )
}

/// Fully layered front door application.
pub fn api_app(service: IngestService) -> Router {
    let body_limit = service.max_upload_bytes().saturating_add(MULTIPART_OVERHEAD);
    api_routes()
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Fully layered metadata store application.
pub fn store_app(store: MetadataStore) -> Router {
    store_routes()
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}
