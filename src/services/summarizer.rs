//! Summarization collaborator.
//!
//! The real model is opaque and slow; `SimulatedSummarizer` stands in for it
//! by waiting a configured delay.

use async_trait::async_trait;
use std::{io, path::Path, time::Duration};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

pub const SIMULATED_SUMMARY: &str = "This is a summary of the document.";

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("staged file {path} unreadable: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("summarization timed out after {0:?}")]
    TimedOut(Duration),
    #[error("summarizer failed: {0}")]
    Failed(String),
}

/// Produces a text summary for a staged file.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, path: &Path) -> Result<String, SummarizeError>;
}

/// Fixed-output summarizer with artificial latency.
#[derive(Clone, Debug)]
pub struct SimulatedSummarizer {
    delay: Duration,
}

impl SimulatedSummarizer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Summarizer for SimulatedSummarizer {
    async fn summarize(&self, path: &Path) -> Result<String, SummarizeError> {
        let meta = fs::metadata(path)
            .await
            .map_err(|source| SummarizeError::Unreadable {
                path: path.display().to_string(),
                source,
            })?;
        debug!(
            "summarizing {} ({} bytes), simulated latency {:?}",
            path.display(),
            meta.len(),
            self.delay
        );

        tokio::time::sleep(self.delay).await;
        Ok(SIMULATED_SUMMARY.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn returns_fixed_summary_for_existing_file() {
        let file = NamedTempFile::new().unwrap();
        let summarizer = SimulatedSummarizer::new(Duration::ZERO);
        let summary = summarizer.summarize(file.path()).await.unwrap();
        assert_eq!(summary, SIMULATED_SUMMARY);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let summarizer = SimulatedSummarizer::new(Duration::ZERO);
        let err = summarizer
            .summarize(Path::new("/definitely/not/here.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizeError::Unreadable { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn waits_the_configured_delay() {
        let file = NamedTempFile::new().unwrap();
        let summarizer = SimulatedSummarizer::new(Duration::from_secs(10));
        let started = tokio::time::Instant::now();
        summarizer.summarize(file.path()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(10));
    }
}
