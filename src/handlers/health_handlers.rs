//! Health & readiness handlers.
//!
//! Front door:
//! - GET /health  -> own status plus reachability of the metadata store
//!
//! Metadata store:
//! - GET /health  -> liveness only, never performs I/O
//! - GET /readyz  -> readiness that checks SQLite connectivity

use crate::services::{ingest_service::IngestService, metadata_store::MetadataStore};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::HashMap;

/// `GET /health` on the front door.
///
/// HTTP 200 when the metadata store answers its own health check, HTTP 503
/// otherwise.
pub async fn api_health(State(service): State<IngestService>) -> impl IntoResponse {
    let store_check = match service.store().health().await {
        Ok(()) => CheckStatus {
            ok: true,
            error: None,
        },
        Err(err) => CheckStatus {
            ok: false,
            error: Some(err.to_string()),
        },
    };

    let mut checks = HashMap::new();
    let overall_ok = store_check.ok;
    checks.insert("data_store", store_check);

    let body = HealthResponse {
        status: if overall_ok { "healthy" } else { "degraded" },
        service: "document-api",
        checks: Some(checks),
    };
    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

/// `GET /health` on the metadata store.
pub async fn store_health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            service: "data-store",
            checks: None,
        }),
    )
}

/// `GET /readyz` on the metadata store.
///
/// Runs `SELECT 1` against SQLite; HTTP 503 when it fails.
pub async fn store_readyz(State(store): State<MetadataStore>) -> impl IntoResponse {
    let sqlite_check = match store.ping().await {
        Ok(()) => CheckStatus {
            ok: true,
            error: None,
        },
        Err(err) => CheckStatus {
            ok: false,
            error: Some(format!("error: {}", err)),
        },
    };

    let overall_ok = sqlite_check.ok;
    let mut checks = HashMap::new();
    checks.insert("sqlite", sqlite_check);

    let body = HealthResponse {
        status: if overall_ok { "ok" } else { "error" },
        service: "data-store",
        checks: Some(checks),
    };
    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    checks: Option<HashMap<&'static str, CheckStatus>>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
