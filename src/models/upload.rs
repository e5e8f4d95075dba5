//! Upload-side types: the buffered upload and the success envelope.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::document::DocumentMetadata;

/// A fully buffered upload, as read from the multipart `file` field.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    pub filename: String,
    /// Client-declared MIME type of the part, if any.
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Response body for a successful `PUT /clients/{client_id}/upload-document`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UploadResponse {
    pub message: String,
    pub client_id: String,
    pub document_id: i64,
    pub metadata: DocumentMetadata,
}

impl UploadResponse {
    pub fn stored(metadata: DocumentMetadata) -> Self {
        Self {
            message: "Document uploaded successfully".into(),
            client_id: metadata.client_id.clone(),
            document_id: metadata.id,
            metadata,
        }
    }
}
