//! Metadata store handlers: create and scoped lookup.

use crate::{
    errors::{AppError, FailureKind},
    models::document::{DocumentMetadata, NewDocumentMetadata},
    services::metadata_store::{MetadataStore, StoreError},
};
use axum::{
    Json,
    extract::{Path, State},
};
use tracing::{error, info};

/// `POST /clients/{client_id}/documents`
pub async fn create_document(
    State(store): State<MetadataStore>,
    Path(client_id): Path<String>,
    Json(payload): Json<NewDocumentMetadata>,
) -> Result<Json<DocumentMetadata>, AppError> {
    match store.create(&client_id, payload).await {
        Ok(record) => {
            info!(
                "Stored metadata for document: {} (client: {}, id: {})",
                record.filename, client_id, record.id
            );
            Ok(Json(record))
        }
        Err(StoreError::Invalid(reason)) => {
            Err(AppError::from_kind(FailureKind::ValidationFailure, reason))
        }
        Err(err) => {
            error!("Error storing document metadata: {}", err);
            Err(AppError::internal("Failed to store document metadata"))
        }
    }
}

/// `GET /clients/{client_id}/documents/{document_id}`
pub async fn get_document(
    State(store): State<MetadataStore>,
    Path((client_id, document_id)): Path<(String, i64)>,
) -> Result<Json<DocumentMetadata>, AppError> {
    match store.get(&client_id, document_id).await {
        Ok(record) => Ok(Json(record)),
        Err(StoreError::NotFound { .. }) => Err(AppError::not_found("Document not found")),
        Err(err) => {
            error!(
                "Error retrieving document {} for client {}: {}",
                document_id, client_id, err
            );
            Err(AppError::internal("Failed to retrieve document metadata"))
        }
    }
}
