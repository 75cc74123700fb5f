//! Assembles an [`Importer`] from environment configuration.

use crate::importer::Importer;
use crate::media_types::MediaTypeRegistry;
use anyhow::{Context, Result};
use arkivo_core::{Config, MetadataBackend};
use arkivo_db::{FileStore, MemoryFileStore};
use arkivo_storage::build_registry;
use std::sync::Arc;

/// Build a ready-to-use importer: validated config, one blob store per
/// bucket, a connected (and migrated) metadata store, and the built-in media
/// type handlers.
pub async fn build_importer(config: &Config) -> Result<Importer> {
    config.validate()?;

    let registry = build_registry(config)
        .await
        .context("Failed to build bucket registry")?;

    let store: Arc<dyn FileStore> = match config.metadata_backend {
        #[cfg(feature = "postgres")]
        MetadataBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL not configured")?;
            let store = arkivo_db::PgFileStore::connect(url)
                .await
                .context("Failed to connect to metadata database")?;
            store
                .migrate()
                .await
                .context("Failed to run metadata migrations")?;
            Arc::new(store)
        }

        #[cfg(not(feature = "postgres"))]
        MetadataBackend::Postgres => anyhow::bail!(
            "Postgres metadata backend not available (postgres feature not enabled)"
        ),

        MetadataBackend::Memory => Arc::new(MemoryFileStore::new()),
    };

    let media_types = Arc::new(MediaTypeRegistry::with_defaults());

    let importer = Importer::new(Arc::new(registry), media_types, store)
        .context("Bucket media-type validation failed")?;

    tracing::info!(
        buckets = importer.buckets().iter().count(),
        default_bucket = importer.buckets().default_bucket_name(),
        "Importer ready"
    );
    Ok(importer)
}
