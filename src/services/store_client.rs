//! HTTP client for the metadata store.
//!
//! One `reqwest::Client` is built at start-up and shared by every request.
//! Each call carries the configured timeout; hitting it counts as the store
//! being unavailable.

use crate::models::document::{DocumentMetadata, NewDocumentMetadata};
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreClientError {
    /// Connection refused, DNS failure, timeout, or similar transport fault.
    #[error("data store unreachable: {0}")]
    Unavailable(#[source] reqwest::Error),
    #[error("document not found")]
    NotFound,
    /// The store answered but not with success.
    #[error("data store responded with {status}: {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("malformed data store response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("invalid data store request: {0}")]
    Request(#[source] reqwest::Error),
    #[error("invalid data store url `{0}`")]
    InvalidUrl(String),
}

pub type StoreClientResult<T> = Result<T, StoreClientError>;

#[derive(Clone, Debug)]
pub struct StoreClient {
    http: Client,
    base_url: Url,
}

impl StoreClient {
    pub fn new(base_url: &str, timeout: Duration) -> StoreClientResult<Self> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| StoreClientError::InvalidUrl(base_url.to_string()))?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(StoreClientError::Request)?;
        Ok(Self { http, base_url })
    }

    /// Append percent-encoded path segments to the base url.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `POST /clients/{client_id}/documents`
    pub async fn create(
        &self,
        client_id: &str,
        doc: &NewDocumentMetadata,
    ) -> StoreClientResult<DocumentMetadata> {
        let url = self.url(&["clients", client_id, "documents"]);
        debug!("POST {}", url);
        let response = self
            .http
            .post(url)
            .json(doc)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(rejected(status, response).await);
        }

        response.json().await.map_err(StoreClientError::Decode)
    }

    /// `GET /clients/{client_id}/documents/{document_id}`
    pub async fn get(
        &self,
        client_id: &str,
        document_id: i64,
    ) -> StoreClientResult<DocumentMetadata> {
        let id = document_id.to_string();
        let url = self.url(&["clients", client_id, "documents", &id]);
        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(classify_send_error)?;

        match response.status() {
            StatusCode::OK => response.json().await.map_err(StoreClientError::Decode),
            StatusCode::NOT_FOUND => Err(StoreClientError::NotFound),
            status => Err(rejected(status, response).await),
        }
    }

    /// `GET /health` on the store.
    pub async fn health(&self) -> StoreClientResult<()> {
        let response = self
            .http
            .get(self.url(&["health"]))
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(rejected(status, response).await)
        }
    }
}

fn classify_send_error(err: reqwest::Error) -> StoreClientError {
    if err.is_builder() {
        StoreClientError::Request(err)
    } else {
        StoreClientError::Unavailable(err)
    }
}

async fn rejected(status: StatusCode, response: reqwest::Response) -> StoreClientError {
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    StoreClientError::Rejected { status, body }
}
