//! Front door handlers: document upload and client-scoped retrieval.
//!
//! Handlers only translate between HTTP and `IngestService`; every failure is
//! logged in full and answered with a stable message.

use crate::{
    errors::{AppError, FailureKind},
    models::{
        document::DocumentMetadata,
        upload::{UploadResponse, UploadedFile},
    },
    services::ingest_service::{IngestError, IngestService},
};
use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
};
use bytes::BytesMut;
use tracing::{debug, error};

/// Name of the multipart part carrying the document.
pub const FILE_FIELD: &str = "file";

/// `PUT /clients/{client_id}/upload-document`
pub async fn upload_document(
    State(service): State<IngestService>,
    Path(client_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let result = match read_upload(multipart, service.max_upload_bytes()).await {
        Ok(upload) => service.ingest(&client_id, upload).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(record) => Ok(Json(UploadResponse::stored(record))),
        Err(err) => Err(upload_failure(&client_id, err)),
    }
}

/// `GET /clients/{client_id}/documents/{document_id}`
pub async fn retrieve_document(
    State(service): State<IngestService>,
    Path((client_id, document_id)): Path<(String, i64)>,
) -> Result<Json<DocumentMetadata>, AppError> {
    service
        .retrieve(&client_id, document_id)
        .await
        .map(Json)
        .map_err(|err| retrieve_failure(&client_id, document_id, err))
}

/// Buffer the `file` part, enforcing `limit` while reading.
async fn read_upload(mut multipart: Multipart, limit: usize) -> Result<UploadedFile, IngestError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|err| multipart_failure(err, limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            debug!("skipping multipart field {:?}", field.name());
            continue;
        }

        let filename = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| IngestError::MalformedUpload("file part has no filename".into()))?;
        let content_type = field.content_type().map(str::to_string);

        let mut buffer = BytesMut::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|err| multipart_failure(err, limit))?
        {
            if buffer.len() + chunk.len() > limit {
                return Err(IngestError::TooLarge { limit });
            }
            buffer.extend_from_slice(&chunk);
        }

        return Ok(UploadedFile {
            filename,
            content_type,
            bytes: buffer.freeze(),
        });
    }

    Err(IngestError::MalformedUpload(format!(
        "missing `{FILE_FIELD}` field"
    )))
}

fn multipart_failure(err: MultipartError, limit: usize) -> IngestError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        IngestError::TooLarge { limit }
    } else {
        IngestError::MalformedUpload(err.body_text())
    }
}

fn upload_failure(client_id: &str, err: IngestError) -> AppError {
    let kind = err.kind();
    match kind {
        FailureKind::TransportUnavailable => {
            error!("Error communicating with data-store: {}", err);
            AppError::from_kind(kind, "Data store service unavailable")
        }
        FailureKind::PersistenceFailure => {
            error!("Failed to store metadata for client {}: {}", client_id, err);
            AppError::from_kind(kind, "Failed to store document metadata")
        }
        FailureKind::PayloadTooLarge => {
            debug!("Rejected upload for client {}: {}", client_id, err);
            AppError::from_kind(kind, "Uploaded file exceeds the size limit")
        }
        FailureKind::ValidationFailure => {
            debug!("Rejected upload for client {}: {}", client_id, err);
            AppError::from_kind(kind, "Invalid upload request")
        }
        FailureKind::NotFound | FailureKind::UnexpectedFailure => {
            error!("Error uploading document for client {}: {}", client_id, err);
            AppError::internal("Failed to upload document")
        }
    }
}

fn retrieve_failure(client_id: &str, document_id: i64, err: IngestError) -> AppError {
    let kind = err.kind();
    match kind {
        FailureKind::NotFound => {
            debug!(
                "Document {} not found for client {}",
                document_id, client_id
            );
            AppError::not_found("Document not found")
        }
        FailureKind::TransportUnavailable => {
            error!("Error communicating with data-store: {}", err);
            AppError::from_kind(kind, "Data store service unavailable")
        }
        FailureKind::ValidationFailure => {
            debug!("Rejected retrieval for client {:?}: {}", client_id, err);
            AppError::from_kind(kind, "Invalid retrieval request")
        }
        FailureKind::PersistenceFailure
        | FailureKind::PayloadTooLarge
        | FailureKind::UnexpectedFailure => {
            error!(
                "Error retrieving document {} for client {}: {}",
                document_id, client_id, err
            );
            AppError::internal("Failed to retrieve document metadata")
        }
    }
}
