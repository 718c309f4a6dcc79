//! Asset repository: record creation for the `assets` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use printvault_core::{AppError, AssetRecord, FileType, NewAssetRecord};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Persistence capability consumed by the upload protocol.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Create a durable record for an object that is already in storage.
    async fn create_record(&self, record: NewAssetRecord) -> Result<AssetRecord, AppError>;
}

/// Row type for the assets table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct AssetRow {
    pub id: Uuid,
    pub kind: String,
    pub filename: String,
    pub storage_key: String,
    pub public_url: String,
    pub size_bytes: i64,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

impl AssetRow {
    pub fn into_record(self) -> Result<AssetRecord, AppError> {
        let kind = self
            .kind
            .parse::<FileType>()
            .map_err(|e| AppError::Internal(format!("Corrupt asset row {}: {}", self.id, e)))?;
        let size = u64::try_from(self.size_bytes).map_err(|_| {
            AppError::Internal(format!(
                "Corrupt asset row {}: negative size {}",
                self.id, self.size_bytes
            ))
        })?;

        Ok(AssetRecord {
            id: self.id,
            kind,
            filename: self.filename,
            storage_key: self.storage_key,
            public_url: self.public_url,
            size,
            content_type: self.content_type,
            created_at: self.created_at,
        })
    }
}

/// PostgreSQL-backed [`AssetStore`].
#[derive(Clone)]
pub struct AssetRepository {
    pool: PgPool,
}

impl AssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssetStore for AssetRepository {
    #[tracing::instrument(
        skip(self, record),
        fields(db.table = "assets", db.operation = "insert", storage_key = %record.storage_key)
    )]
    async fn create_record(&self, record: NewAssetRecord) -> Result<AssetRecord, AppError> {
        let size_bytes = i64::try_from(record.size).map_err(|_| {
            AppError::InvalidInput(format!("File size {} out of range", record.size))
        })?;

        let row = sqlx::query_as::<Postgres, AssetRow>(
            r#"
            INSERT INTO assets (id, kind, filename, storage_key, public_url, size_bytes, content_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, kind, filename, storage_key, public_url, size_bytes, content_type, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(record.kind.as_str())
        .bind(&record.filename)
        .bind(&record.storage_key)
        .bind(&record.public_url)
        .bind(size_bytes)
        .bind(&record.content_type)
        .fetch_one(&self.pool)
        .await?;

        row.into_record()
    }
}
