//! src/services/metadata_store.rs
//!
//! MetadataStore — the service of record for document metadata, backed by
//! SQLite. Every read is scoped by `(client_id, id)`; a record owned by a
//! different client is indistinguishable from one that does not exist.

use crate::models::document::{DocumentMetadata, NewDocumentMetadata};
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {document_id} not found for client `{client_id}`")]
    NotFound {
        client_id: String,
        document_id: i64,
    },
    #[error("invalid document metadata: {0}")]
    Invalid(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

const SELECT_COLUMNS: &str = "id, client_id, filename, file_size, file_type, content_type, \
     upload_timestamp, file_path, summary";

/// Current UTC time with millisecond precision, in RFC 3339 form.
const NOW_UTC: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

/// Persists and looks up `DocumentMetadata` records.
///
/// Cloning is cheap; all clones share one connection pool.
#[derive(Clone)]
pub struct MetadataStore {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl MetadataStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Reject payloads that would violate the table's constraints.
    fn ensure_valid(client_id: &str, doc: &NewDocumentMetadata) -> StoreResult<()> {
        if client_id.trim().is_empty() {
            return Err(StoreError::Invalid("client_id must not be empty".into()));
        }
        if doc.filename.is_empty() {
            return Err(StoreError::Invalid("filename must not be empty".into()));
        }
        if doc.file_size < 0 {
            return Err(StoreError::Invalid("file_size must not be negative".into()));
        }
        if doc.file_type.is_empty() {
            return Err(StoreError::Invalid("file_type must not be empty".into()));
        }
        Ok(())
    }

    /// Insert a new record for `client_id`.
    ///
    /// The path-supplied `client_id` overrides any value in the body. The id
    /// and `upload_timestamp` are both assigned by SQLite inside a single
    /// `INSERT .. RETURNING`, under the write lock, so a larger id never
    /// carries an earlier timestamp.
    pub async fn create(
        &self,
        client_id: &str,
        doc: NewDocumentMetadata,
    ) -> StoreResult<DocumentMetadata> {
        Self::ensure_valid(client_id, &doc)?;

        if let Some(body_client) = doc.client_id.as_deref() {
            if body_client != client_id {
                debug!(
                    "body client_id `{}` overridden by path client_id `{}`",
                    body_client, client_id
                );
            }
        }

        let record = sqlx::query_as::<_, DocumentMetadata>(&format!(
            "INSERT INTO document_metadata (
                client_id, filename, file_size, file_type, content_type,
                upload_timestamp, file_path, summary
            ) VALUES (?, ?, ?, ?, ?, {NOW_UTC}, ?, ?)
            RETURNING {SELECT_COLUMNS}"
        ))
        .bind(client_id)
        .bind(&doc.filename)
        .bind(doc.file_size)
        .bind(&doc.file_type)
        .bind(&doc.content_type)
        .bind(&doc.file_path)
        .bind(&doc.summary)
        .fetch_one(&*self.db)
        .await?;

        Ok(record)
    }

    /// Fetch a record by `(client_id, document_id)`.
    pub async fn get(&self, client_id: &str, document_id: i64) -> StoreResult<DocumentMetadata> {
        sqlx::query_as::<_, DocumentMetadata>(&format!(
            "SELECT {SELECT_COLUMNS} FROM document_metadata WHERE client_id = ? AND id = ?"
        ))
        .bind(client_id)
        .bind(document_id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or_else(|| StoreError::NotFound {
            client_id: client_id.to_string(),
            document_id,
        })
    }

    /// Lightweight connectivity probe used by readiness checks.
    pub async fn ping(&self) -> StoreResult<()> {
        let one: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&*self.db).await?;
        if one != 1 {
            return Err(StoreError::Invalid(format!("unexpected probe result: {one}")));
        }
        Ok(())
    }
}
