//! End-to-end tests: front door + metadata store over real HTTP.

mod common;

use axum::{Router, http::StatusCode, routing::post};
use common::{Harness, PLAIN_TEXT_57, closed_url, spawn, spawn_store};
use document_ingest::models::{document::DocumentMetadata, upload::UploadResponse};
use futures::future::join_all;
use serde_json::Value;
use std::{collections::HashSet, path::Path};

#[tokio::test]
async fn plain_text_upload_sniffs_type_and_keeps_declared_type() {
    let store = spawn_store().await;
    let h = Harness::new(&store).await;

    let response = h
        .upload("c1", "test_document.txt", PLAIN_TEXT_57, "application/octet-stream")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: UploadResponse = response.json().await.unwrap();
    assert_eq!(body.message, "Document uploaded successfully");
    assert_eq!(body.client_id, "c1");
    assert_eq!(body.document_id, body.metadata.id);
    assert_eq!(body.metadata.file_size, 57);
    assert_eq!(body.metadata.file_type, "text/plain");
    assert_eq!(
        body.metadata.content_type.as_deref(),
        Some("application/octet-stream")
    );
    assert_eq!(body.metadata.filename, "test_document.txt");
    assert!(body.metadata.summary.is_some());

    let staged = body.metadata.file_path.expect("staging path recorded");
    assert!(Path::new(&staged).starts_with(h.staging.path()));
    assert!(!Path::new(&staged).exists());
    assert_eq!(h.staged_files(), 0);
}

#[tokio::test]
async fn uploaded_document_is_retrievable_by_its_owner() {
    let store = spawn_store().await;
    let h = Harness::new(&store).await;

    let uploaded: UploadResponse = h
        .upload("test-client-123", "notes.txt", b"some notes\n", "text/plain")
        .await
        .json()
        .await
        .unwrap();

    let response = h.retrieve("test-client-123", uploaded.document_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: DocumentMetadata = response.json().await.unwrap();
    assert_eq!(fetched, uploaded.metadata);
}

#[tokio::test]
async fn other_client_cannot_read_document() {
    let store = spawn_store().await;
    let h = Harness::new(&store).await;

    let uploaded: UploadResponse = h
        .upload("client-a", "private.txt", b"secret\n", "text/plain")
        .await
        .json()
        .await
        .unwrap();

    let response = h.retrieve("different-client-456", uploaded.document_id).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Document not found");
}

#[tokio::test]
async fn never_created_document_is_not_found() {
    let store = spawn_store().await;
    let h = Harness::new(&store).await;

    let response = h.retrieve("c1", 999_999).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn identical_same_second_uploads_are_distinct_records() {
    let store = spawn_store().await;
    let h = Harness::new(&store).await;

    let responses = join_all(
        (0..4).map(|_| h.upload("c1", "same.txt", PLAIN_TEXT_57, "text/plain")),
    )
    .await;

    let mut ids = HashSet::new();
    let mut paths = HashSet::new();
    for response in responses {
        assert_eq!(response.status(), StatusCode::OK);
        let body: UploadResponse = response.json().await.unwrap();
        ids.insert(body.document_id);
        paths.insert(body.metadata.file_path.unwrap());
    }
    assert_eq!(ids.len(), 4);
    assert_eq!(paths.len(), 4);
    assert_eq!(h.staged_files(), 0);
}

#[tokio::test]
async fn unreachable_store_is_503_and_staging_is_cleaned() {
    let h = Harness::new(&closed_url()).await;

    let response = h
        .upload("c1", "doc.txt", PLAIN_TEXT_57, "text/plain")
        .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Data store service unavailable");
    assert_eq!(h.staged_files(), 0);

    let response = h.retrieve("c1", 1).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn store_rejection_is_generic_500_and_staging_is_cleaned() {
    let failing = Router::new().route(
        "/clients/{client_id}/documents",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "disk full") }),
    );
    let store = format!("http://{}", spawn(failing).await);
    let h = Harness::new(&store).await;

    let response = h
        .upload("c1", "doc.txt", PLAIN_TEXT_57, "text/plain")
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to store document metadata");
    assert!(!body.to_string().contains("disk full"));
    assert_eq!(h.staged_files(), 0);
}

#[tokio::test]
async fn oversized_upload_is_413_and_nothing_is_staged() {
    let store = spawn_store().await;
    let h = Harness::with_limit(&store, 1024).await;

    let response = h
        .upload("c1", "big.bin", &vec![b'a'; 4096], "text/plain")
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Uploaded file exceeds the size limit");
    assert_eq!(h.staged_files(), 0);

    // Exactly at the limit is fine.
    let response = h
        .upload("c1", "edge.txt", &vec![b'a'; 1024], "text/plain")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let store = spawn_store().await;
    let h = Harness::new(&store).await;

    let form = reqwest::multipart::Form::new().text("note", "no file here");
    let response = h
        .http
        .put(format!("{}/clients/c1/upload-document", h.api))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid upload request");
}

#[tokio::test]
async fn malformed_multipart_gets_a_stable_message() {
    let store = spawn_store().await;
    let h = Harness::new(&store).await;

    let response = h
        .http
        .put(format!("{}/clients/c1/upload-document", h.api))
        .header("content-type", "multipart/form-data; boundary=XYZ")
        .body("--XYZ\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\n\r\ntruncated")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid upload request");
    assert_eq!(h.staged_files(), 0);
}

#[tokio::test]
async fn long_client_id_and_filename_upload_succeeds() {
    let store = spawn_store().await;
    let h = Harness::new(&store).await;

    let client = "c".repeat(200);
    let filename = format!("{}.txt", "r".repeat(200));
    let response = h.upload(&client, &filename, PLAIN_TEXT_57, "text/plain").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: UploadResponse = response.json().await.unwrap();
    assert_eq!(body.client_id, client);
    assert_eq!(body.metadata.filename, filename);
    assert_eq!(h.staged_files(), 0);
}

#[tokio::test]
async fn empty_upload_is_stored_with_empty_type() {
    let store = spawn_store().await;
    let h = Harness::new(&store).await;

    let response = h.upload("c1", "empty.txt", b"", "text/plain").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: UploadResponse = response.json().await.unwrap();
    assert_eq!(body.metadata.file_size, 0);
    assert_eq!(body.metadata.file_type, "application/x-empty");
}

#[tokio::test]
async fn front_door_health_reports_store_reachability() {
    let store = spawn_store().await;
    let up = Harness::new(&store).await;
    let response = up
        .http
        .get(format!("{}/health", up.api))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["service"], "document-api");
    assert_eq!(body["checks"]["data_store"]["ok"], true);

    let down = Harness::new(&closed_url()).await;
    let response = down
        .http
        .get(format!("{}/health", down.api))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["checks"]["data_store"]["ok"], false);
}
