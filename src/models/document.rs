//! Represents the metadata record kept for every uploaded document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted document metadata record, owned by the metadata store.
///
/// Records are addressed by the pair `(client_id, id)`; the numeric `id` on
/// its own never grants access to a record.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct DocumentMetadata {
    /// Store-assigned identifier.
    pub id: i64,

    /// Owning tenant.
    pub client_id: String,

    /// Filename as supplied by the uploader.
    pub filename: String,

    /// Size of the uploaded content in bytes.
    pub file_size: i64,

    /// MIME type sniffed from the content bytes.
    pub file_type: String,

    /// MIME type declared by the client, kept for reference only.
    pub content_type: Option<String>,

    /// When the store inserted this record.
    pub upload_timestamp: DateTime<Utc>,

    /// Staging path used by the front door while handling the upload.
    pub file_path: Option<String>,

    /// Free-form summary produced by the summarizer.
    pub summary: Option<String>,
}

/// Body of `POST /clients/{client_id}/documents`.
///
/// `client_id` is accepted for compatibility but the path segment always wins.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct NewDocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub filename: String,
    pub file_size: i64,
    pub file_type: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}
