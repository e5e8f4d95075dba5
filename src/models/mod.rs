//! Data models shared by the front door and the metadata store.
//!
//! `DocumentMetadata` maps to the `document_metadata` table via
//! `sqlx::FromRow` and is also the JSON shape exchanged between the two
//! services.

pub mod document;
pub mod upload;
