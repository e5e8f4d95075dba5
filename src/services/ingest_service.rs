//! src/services/ingest_service.rs
//!
//! IngestService — the front door's upload pipeline and scoped retrieval.
//!
//! An upload runs strictly in order: sniff, stage, summarize, persist. The
//! staged file is discarded before `ingest` returns, whichever step failed.
//! Results are plain `IngestResult`s; translating them to HTTP is left to the
//! handlers.

use crate::{
    errors::FailureKind,
    models::{
        document::{DocumentMetadata, NewDocumentMetadata},
        upload::UploadedFile,
    },
    services::{
        sniff::sniff_mime,
        staging::{StagedUpload, Stager},
        store_client::{StoreClient, StoreClientError},
        summarizer::{SummarizeError, Summarizer},
    },
};
use std::{io, sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{info, warn};

/// Default ceiling for a single upload (25 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
/// Default bound on one summarization call.
pub const DEFAULT_SUMMARY_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("client id must not be empty")]
    InvalidClientId,
    #[error("malformed upload: {0}")]
    MalformedUpload(String),
    #[error("upload exceeds the {limit} byte limit")]
    TooLarge { limit: usize },
    #[error("failed to stage upload: {0}")]
    Staging(#[source] io::Error),
    #[error(transparent)]
    Summarization(#[from] SummarizeError),
    #[error(transparent)]
    Store(#[from] StoreClientError),
}

impl IngestError {
    pub fn kind(&self) -> FailureKind {
        match self {
            IngestError::InvalidClientId | IngestError::MalformedUpload(_) => {
                FailureKind::ValidationFailure
            }
            IngestError::TooLarge { .. } => FailureKind::PayloadTooLarge,
            IngestError::Staging(_) | IngestError::Summarization(_) => {
                FailureKind::UnexpectedFailure
            }
            IngestError::Store(err) => match err {
                StoreClientError::Unavailable(_) => FailureKind::TransportUnavailable,
                StoreClientError::NotFound => FailureKind::NotFound,
                StoreClientError::Rejected { .. } => FailureKind::PersistenceFailure,
                StoreClientError::Decode(_)
                | StoreClientError::Request(_)
                | StoreClientError::InvalidUrl(_) => FailureKind::UnexpectedFailure,
            },
        }
    }
}

pub type IngestResult<T> = Result<T, IngestError>;

/// Orchestrates uploads and retrievals against the metadata store.
///
/// Holds no locks; concurrent requests share only the HTTP client, the
/// summarizer and the staging directory.
#[derive(Clone)]
pub struct IngestService {
    store: StoreClient,
    summarizer: Arc<dyn Summarizer>,
    stager: Stager,
    max_upload_bytes: usize,
    summary_timeout: Duration,
}

impl IngestService {
    pub fn new(store: StoreClient, summarizer: Arc<dyn Summarizer>, stager: Stager) -> Self {
        Self {
            store,
            summarizer,
            stager,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            summary_timeout: DEFAULT_SUMMARY_TIMEOUT,
        }
    }

    pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    pub fn with_summary_timeout(mut self, timeout: Duration) -> Self {
        self.summary_timeout = timeout;
        self
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub fn store(&self) -> &StoreClient {
        &self.store
    }

    /// Run the upload pipeline for `client_id` and return the stored record.
    pub async fn ingest(
        &self,
        client_id: &str,
        upload: UploadedFile,
    ) -> IngestResult<DocumentMetadata> {
        ensure_client_id(client_id)?;
        if upload.bytes.len() > self.max_upload_bytes {
            return Err(IngestError::TooLarge {
                limit: self.max_upload_bytes,
            });
        }

        let file_type = sniff_mime(&upload.bytes);
        let staged = self
            .stager
            .stage(client_id, &upload.filename, &upload.bytes)
            .await
            .map_err(IngestError::Staging)?;

        let outcome = self
            .summarize_and_store(client_id, &upload, file_type, &staged)
            .await;

        let staged_path = staged.path().display().to_string();
        if let Err(err) = staged.discard().await {
            warn!("failed to remove staged file {}: {}", staged_path, err);
        }

        if let Ok(record) = &outcome {
            info!(
                "Successfully uploaded document: {} for client: {} (id {})",
                record.filename, client_id, record.id
            );
        }
        outcome
    }

    async fn summarize_and_store(
        &self,
        client_id: &str,
        upload: &UploadedFile,
        file_type: &str,
        staged: &StagedUpload,
    ) -> IngestResult<DocumentMetadata> {
        let summary = tokio::time::timeout(
            self.summary_timeout,
            self.summarizer.summarize(staged.path()),
        )
        .await
        .map_err(|_| SummarizeError::TimedOut(self.summary_timeout))??;

        let payload = NewDocumentMetadata {
            client_id: Some(client_id.to_string()),
            filename: upload.filename.clone(),
            file_size: upload.bytes.len() as i64,
            file_type: file_type.to_string(),
            content_type: upload.content_type.clone(),
            file_path: Some(staged.path().display().to_string()),
            summary: Some(summary),
        };

        Ok(self.store.create(client_id, &payload).await?)
    }

    /// Scoped lookup proxied to the metadata store.
    pub async fn retrieve(
        &self,
        client_id: &str,
        document_id: i64,
    ) -> IngestResult<DocumentMetadata> {
        ensure_client_id(client_id)?;
        let record = self.store.get(client_id, document_id).await?;
        info!(
            "Retrieved metadata for document ID: {} (client: {})",
            document_id, client_id
        );
        Ok(record)
    }
}

fn ensure_client_id(client_id: &str) -> IngestResult<()> {
    if client_id.trim().is_empty() {
        return Err(IngestError::InvalidClientId);
    }
    Ok(())
}
