//! Core services.
//!
//! Front door: `ingest_service` orchestrates `sniff`, `staging`,
//! `summarizer` and `store_client`.
//! Metadata store: `metadata_store` on top of `migrations`.

pub mod ingest_service;
pub mod metadata_store;
pub mod migrations;
pub mod sniff;
pub mod staging;
pub mod store_client;
pub mod summarizer;
