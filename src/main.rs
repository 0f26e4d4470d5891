//! lending-indexer entry point.
//!
//! Reads receipts as JSON lines and indexes them into the configured store.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufRead, BufReader};
use tracing_subscriber::EnvFilter;

use lending_indexer::config::{IndexerConfig, LogFormat};
use lending_indexer::ingest;
use lending_indexer::persistence::{EntityStore, MemoryStore, PostgresStore};
use lending_indexer::service::ReceiptIndexer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = IndexerConfig::from_env().context("loading configuration")?;

    // Initialize tracing
    init_tracing(config.log_format);
    tracing::info!(
        source = %config.receipt_source,
        persistence = config.persistence_enabled,
        missing_event_policy = config.missing_event_policy.as_str(),
        "starting lending-indexer"
    );

    // Build persistence layer
    let store: Arc<dyn EntityStore> = if config.persistence_enabled {
        let postgres = PostgresStore::connect(&config)
            .await
            .context("connecting to database")?;
        if config.run_migrations {
            postgres.migrate().await.context("running migrations")?;
        }
        Arc::new(postgres)
    } else {
        tracing::warn!("persistence disabled; records are kept in memory only");
        Arc::new(MemoryStore::new())
    };

    // Build service layer
    let indexer = ReceiptIndexer::new(store, config.missing_event_policy);

    // Feed receipts
    let reader = open_source(&config.receipt_source).await?;
    let stats = ingest::run(&indexer, reader, config.halt_on_error).await?;

    tracing::info!(
        processed = stats.receipts_processed,
        failed = stats.receipts_failed,
        aborted = stats.receipts_aborted,
        records = stats.records_written,
        "receipt feed finished"
    );

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn open_source(source: &str) -> anyhow::Result<Box<dyn AsyncBufRead + Unpin>> {
    if source == "-" {
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }
    let file = tokio::fs::File::open(source)
        .await
        .with_context(|| format!("opening receipt source {source}"))?;
    Ok(Box::new(BufReader::new(file)))
}
