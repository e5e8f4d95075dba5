use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::{env, str::FromStr, time::Duration};

use crate::services::ingest_service::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_SUMMARY_TIMEOUT};

/// Command-line entry point.
#[derive(Parser, Debug)]
#[command(author, version, about = "Document ingestion API and metadata store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the ingestion front door
    Api(ApiArgs),
    /// Run the metadata store
    Store(StoreArgs),
}

/// Front door flags; each overrides its environment variable.
#[derive(Args, Debug, Default)]
pub struct ApiArgs {
    /// Host to bind to (overrides DOCUMENT_API_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides DOCUMENT_API_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Base URL of the metadata store (overrides DATA_STORE_URL)
    #[arg(long)]
    pub data_store_url: Option<String>,

    /// Directory for staged uploads (overrides DOCUMENT_API_STAGING_DIR)
    #[arg(long)]
    pub staging_dir: Option<String>,

    /// Largest accepted upload in bytes (overrides DOCUMENT_API_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    /// Timeout for metadata store calls (overrides DATA_STORE_TIMEOUT_SECS)
    #[arg(long)]
    pub store_timeout_secs: Option<u64>,

    /// Simulated summarizer latency (overrides SUMMARY_DELAY_SECS)
    #[arg(long)]
    pub summary_delay_secs: Option<u64>,

    /// Upper bound on one summarization (overrides SUMMARY_TIMEOUT_SECS)
    #[arg(long)]
    pub summary_timeout_secs: Option<u64>,
}

/// Metadata store flags; each overrides its environment variable.
#[derive(Args, Debug, Default)]
pub struct StoreArgs {
    /// Host to bind to (overrides DATA_STORE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides DATA_STORE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

/// Front door configuration, built once at start-up.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub data_store_url: String,
    pub staging_dir: String,
    pub max_upload_bytes: usize,
    pub store_timeout: Duration,
    pub summary_delay: Duration,
    pub summary_timeout: Duration,
}

/// Metadata store configuration, built once at start-up.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
}

impl ApiConfig {
    /// Merge CLI flags over environment variables over defaults.
    pub fn from_env_and_args(args: ApiArgs) -> Result<Self> {
        let env_host = env::var("DOCUMENT_API_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = env_or("DOCUMENT_API_PORT", 8000u16)?;
        let env_store_url =
            env::var("DATA_STORE_URL").unwrap_or_else(|_| "http://localhost:8001".into());
        let env_staging =
            env::var("DOCUMENT_API_STAGING_DIR").unwrap_or_else(|_| "./data/uploads".into());
        let env_max_upload = env_or("DOCUMENT_API_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
        let env_store_timeout = env_or("DATA_STORE_TIMEOUT_SECS", 30u64)?;
        let env_summary_delay = env_or("SUMMARY_DELAY_SECS", 10u64)?;
        let env_summary_timeout =
            env_or("SUMMARY_TIMEOUT_SECS", DEFAULT_SUMMARY_TIMEOUT.as_secs())?;

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            data_store_url: args.data_store_url.unwrap_or(env_store_url),
            staging_dir: args.staging_dir.unwrap_or(env_staging),
            max_upload_bytes: args.max_upload_bytes.unwrap_or(env_max_upload),
            store_timeout: Duration::from_secs(
                args.store_timeout_secs.unwrap_or(env_store_timeout),
            ),
            summary_delay: Duration::from_secs(
                args.summary_delay_secs.unwrap_or(env_summary_delay),
            ),
            summary_timeout: Duration::from_secs(
                args.summary_timeout_secs.unwrap_or(env_summary_timeout),
            ),
        })
    }
}

impl StoreConfig {
    /// Merge CLI flags over environment variables; also returns the migrate flag.
    pub fn from_env_and_args(args: StoreArgs) -> Result<(Self, bool)> {
        let env_host = env::var("DATA_STORE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = env_or("DATA_STORE_PORT", 8001u16)?;
        let env_db = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/meta/document_metadata.db".into());

        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
        };

        Ok((cfg, args.migrate))
    }
}

/// Read and parse `name`, falling back to `default` when it is unset.
fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_var(name, env::var(name), default)
}

fn parse_var<T>(name: &str, value: Result<String, env::VarError>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}
