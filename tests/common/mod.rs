//! Shared harness: both services on ephemeral loopback ports.

#![allow(dead_code)]

use axum::Router;
use document_ingest::{
    routes::routes::{api_app, store_app},
    services::{
        ingest_service::IngestService,
        metadata_store::MetadataStore,
        migrations::run_migrations,
        staging::Stager,
        store_client::StoreClient,
        summarizer::SimulatedSummarizer,
    },
};
use reqwest::multipart::{Form, Part};
use sqlx::sqlite::SqlitePoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const PLAIN_TEXT_57: &[u8] = b"This is a test document for the Robin interview process.\n";

pub async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A metadata store backed by a private in-memory database.
pub async fn spawn_store() -> String {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    let addr = spawn(store_app(MetadataStore::new(Arc::new(pool)))).await;
    format!("http://{addr}")
}

/// A loopback URL nothing is listening on.
pub fn closed_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub struct Harness {
    pub api: String,
    pub staging: TempDir,
    pub http: reqwest::Client,
}

impl Harness {
    pub async fn new(store_url: &str) -> Self {
        Self::with_limit(store_url, 1024 * 1024).await
    }

    pub async fn with_limit(store_url: &str, max_upload_bytes: usize) -> Self {
        let staging = TempDir::new().unwrap();
        let store = StoreClient::new(store_url, Duration::from_secs(5)).unwrap();
        let service = IngestService::new(
            store,
            Arc::new(SimulatedSummarizer::new(Duration::ZERO)),
            Stager::new(staging.path()),
        )
        .with_max_upload_bytes(max_upload_bytes);
        let addr = spawn(api_app(service)).await;

        Self {
            api: format!("http://{addr}"),
            staging,
            http: reqwest::Client::new(),
        }
    }

    pub async fn upload(
        &self,
        client_id: &str,
        filename: &str,
        content: &[u8],
        declared: &str,
    ) -> reqwest::Response {
        let part = Part::bytes(content.to_vec())
            .file_name(filename.to_string())
            .mime_str(declared)
            .unwrap();
        self.http
            .put(format!("{}/clients/{}/upload-document", self.api, client_id))
            .multipart(Form::new().part("file", part))
            .send()
            .await
            .unwrap()
    }

    pub async fn retrieve(&self, client_id: &str, document_id: i64) -> reqwest::Response {
        self.http
            .get(format!(
                "{}/clients/{}/documents/{}",
                self.api, client_id, document_id
            ))
            .send()
            .await
            .unwrap()
    }

    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.staging.path()).unwrap().count()
    }
}
