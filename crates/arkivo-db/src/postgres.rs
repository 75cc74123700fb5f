//! Postgres metadata store backed by sqlx.

use crate::store::{FileStore, FileTransaction, MetadataError, MetadataResult};
use arkivo_core::{MediaFile, MediaFileRow};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Duration;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgFileStore {
    pool: PgPool,
}

impl PgFileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool with library defaults and wrap it.
    pub async fn connect(database_url: &str) -> MetadataResult<Self> {
        tracing::info!("Connecting to metadata database...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(database_url)
            .await?;
        tracing::info!("Metadata database connected");
        Ok(Self { pool })
    }

    /// Run pending migrations from the crate's `migrations/` directory.
    pub async fn migrate(&self) -> MetadataResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Metadata migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl FileStore for PgFileStore {
    async fn begin(&self) -> MetadataResult<Box<dyn FileTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgFileTransaction { tx: Some(tx) }))
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "media_files", db.operation = "select", db.record_id = %id)
    )]
    async fn find(&self, id: Uuid) -> MetadataResult<Option<MediaFile>> {
        let row: Option<MediaFileRow> =
            sqlx::query_as::<Postgres, MediaFileRow>("SELECT * FROM media_files WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(MediaFileRow::into_media_file))
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "media_files", db.operation = "select")
    )]
    async fn list_bucket(&self, bucket: &str) -> MetadataResult<Vec<MediaFile>> {
        let rows: Vec<MediaFileRow> = sqlx::query_as::<Postgres, MediaFileRow>(
            "SELECT * FROM media_files WHERE bucket = $1 ORDER BY created_at DESC",
        )
        .bind(bucket)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(MediaFileRow::into_media_file).collect())
    }
}

pub struct PgFileTransaction {
    tx: Option<Transaction<'static, Postgres>>,
}

#[async_trait]
impl FileTransaction for PgFileTransaction {
    #[tracing::instrument(
        skip(self, file),
        fields(db.table = "media_files", db.operation = "upsert")
    )]
    async fn persist(&mut self, file: &mut MediaFile) -> MetadataResult<()> {
        let tx = self.tx.as_mut().ok_or(MetadataError::Completed)?;
        let id = file.id.ok_or(MetadataError::MissingId)?;

        let now = Utc::now();
        if file.created_at.is_none() {
            file.created_at = Some(now);
        }
        file.updated_at = Some(now);

        let (location_kind, location_ref) = match &file.location {
            Some(location) => (
                Some(location.kind().to_string()),
                Some(location.as_str().to_string()),
            ),
            None => (None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO media_files (
                id, name, location_kind, location_ref, bucket,
                mime_type, charset, media_type, type_options, owner_ref,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                location_kind = EXCLUDED.location_kind,
                location_ref = EXCLUDED.location_ref,
                bucket = EXCLUDED.bucket,
                mime_type = EXCLUDED.mime_type,
                charset = EXCLUDED.charset,
                media_type = EXCLUDED.media_type,
                type_options = EXCLUDED.type_options,
                owner_ref = EXCLUDED.owner_ref,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(id)
        .bind(&file.name)
        .bind(location_kind)
        .bind(location_ref)
        .bind(&file.bucket)
        .bind(&file.mime_type)
        .bind(&file.charset)
        .bind(&file.media_type)
        .bind(&file.type_options)
        .bind(&file.owner)
        .bind(file.created_at)
        .bind(file.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    #[tracing::instrument(
        skip(self, file),
        fields(db.table = "media_files", db.operation = "delete")
    )]
    async fn remove(&mut self, file: &MediaFile) -> MetadataResult<()> {
        let tx = self.tx.as_mut().ok_or(MetadataError::Completed)?;
        let id = file.id.ok_or(MetadataError::MissingId)?;

        let result = sqlx::query("DELETE FROM media_files WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound(id));
        }
        Ok(())
    }

    async fn flush(&mut self) -> MetadataResult<()> {
        // Statements run against the transaction as they are issued; nothing
        // is buffered client-side.
        if self.tx.is_none() {
            return Err(MetadataError::Completed);
        }
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> MetadataResult<()> {
        let tx = self.tx.take().ok_or(MetadataError::Completed)?;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> MetadataResult<()> {
        let tx = self.tx.take().ok_or(MetadataError::Completed)?;
        tx.rollback().await?;
        Ok(())
    }
}

impl Drop for PgFileTransaction {
    fn drop(&mut self) {
        // sqlx rolls the underlying transaction back when it is dropped.
        if self.tx.is_some() {
            tracing::warn!("Metadata transaction dropped without commit or rollback");
        }
    }
}

// Run with a disposable database:
//   DATABASE_URL=postgres://localhost/arkivo_test cargo test -p arkivo-db -- --ignored
#[cfg(test)]
mod tests {
    use super::*;
    use arkivo_core::Location;

    async fn connect_from_env() -> PgFileStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let store = PgFileStore::connect(&url).await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    #[ignore]
    async fn test_persist_find_remove_round_trip() {
        let store = connect_from_env().await;

        let mut file = MediaFile::new("report.pdf", "default");
        file.id = Some(Uuid::new_v4());
        file.location = Some(Location::file("ab12.pdf"));
        file.mime_type = "application/pdf".to_string();
        file.charset = "binary".to_string();
        file.media_type = Some("pdf".to_string());
        let id = file.id.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.persist(&mut file).await.unwrap();
        tx.commit().await.unwrap();

        let found = store.find(id).await.unwrap().unwrap();
        assert_eq!(found.name, "report.pdf");
        assert_eq!(found.location, Some(Location::file("ab12.pdf")));
        assert_eq!(found.media_type.as_deref(), Some("pdf"));

        let mut tx = store.begin().await.unwrap();
        tx.remove(&file).await.unwrap();
        tx.commit().await.unwrap();

        assert!(store.find(id).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore]
    async fn test_rollback_leaves_no_row() {
        let store = connect_from_env().await;

        let mut file = MediaFile::new("draft.txt", "default");
        file.id = Some(Uuid::new_v4());
        file.mime_type = "text/plain".to_string();
        file.charset = "us-ascii".to_string();
        let id = file.id.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.persist(&mut file).await.unwrap();
        tx.flush().await.unwrap();
        tx.rollback().await.unwrap();

        assert!(store.find(id).await.unwrap().is_none());
    }
}
