use anyhow::{Context, Result};
use clap::Parser;
use document_ingest::{
    config::{ApiConfig, Cli, Command, StoreConfig},
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
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{io::ErrorKind, path::Path, str::FromStr, sync::Arc};
use tokio::{fs, net::TcpListener};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Api(args) => run_api(ApiConfig::from_env_and_args(args)?).await,
        Command::Store(args) => {
            let (cfg, migrate) = StoreConfig::from_env_and_args(args)?;
            run_store(cfg, migrate).await
        }
    }
}

async fn run_api(cfg: ApiConfig) -> Result<()> {
    tracing::info!("Starting document-api with config: {:?}", cfg);

    // --- Ensure staging directory exists ---
    if !Path::new(&cfg.staging_dir).exists() {
        fs::create_dir_all(&cfg.staging_dir).await?;
        tracing::info!("Created staging directory at {}", cfg.staging_dir);
    }

    let store = StoreClient::new(&cfg.data_store_url, cfg.store_timeout)
        .with_context(|| format!("configuring data store client for {}", cfg.data_store_url))?;
    let service = IngestService::new(
        store,
        Arc::new(SimulatedSummarizer::new(cfg.summary_delay)),
        Stager::new(&cfg.staging_dir),
    )
    .with_max_upload_bytes(cfg.max_upload_bytes)
    .with_summary_timeout(cfg.summary_timeout);

    serve(api_app(service), &cfg.host, cfg.port).await
}

async fn run_store(cfg: StoreConfig, migrate: bool) -> Result<()> {
    tracing::info!("Starting data-store with config: {:?}", cfg);

    // --- Initialize SQLite connection ---
    let db_url = &cfg.database_url;
    let db_path = db_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .trim_start_matches("file:");
    tracing::debug!("Interpreted SQLite path => {}", db_path);

    // Create parent directory if needed
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }

    let options = SqliteConnectOptions::from_str(db_url)
        .with_context(|| format!("parsing database url {}", db_url))?
        .create_if_missing(true);
    let db = Arc::new(
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?,
    );

    // --- Migrations ---
    let applied = run_migrations(&db).await?;
    tracing::info!("Applied {} pending migration(s).", applied);
    if migrate {
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }

    let store = MetadataStore::new(db);
    serve(store_app(store), &cfg.host, cfg.port).await
}

/// Bind and serve; a denied wildcard bind falls back to loopback.
async fn serve(app: axum::Router, host: &str, port: u16) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied && matches!(host, "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
