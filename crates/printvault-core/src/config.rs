//! Configuration module
//!
//! Environment-driven settings for the import pipeline: storage backend, database
//! connection, validation limits, and upload/transfer tuning.

use std::env;
use std::time::Duration;

use crate::storage_types::StorageBackend;

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_MODEL_SIZE_MB: u64 = 500;
const MAX_SLICE_SIZE_MB: u64 = 50;
const MAX_ARCHIVE_SIZE_MB: u64 = 500;
const UPLOAD_SLOT_TTL_SECS: u64 = 15 * 60;
const IMPORT_CONCURRENCY: usize = 4;
const TRANSFER_MAX_RETRIES: u32 = 0;
const TRANSFER_RETRY_BACKOFF_MS: u64 = 500;

const MIB: u64 = 1024 * 1024;

/// Import pipeline configuration.
#[derive(Clone, Debug)]
pub struct ImportConfig {
    pub environment: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, R2, etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Validation limits
    pub max_model_size_bytes: u64,
    pub max_slice_size_bytes: u64,
    pub max_archive_size_bytes: u64,
    // Upload tuning
    pub upload_slot_ttl_secs: u64,
    pub import_concurrency: usize,
    pub transfer_max_retries: u32,
    pub transfer_retry_backoff_ms: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            database_url: None,
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            storage_backend: None,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: None,
            local_storage_base_url: None,
            max_model_size_bytes: MAX_MODEL_SIZE_MB * MIB,
            max_slice_size_bytes: MAX_SLICE_SIZE_MB * MIB,
            max_archive_size_bytes: MAX_ARCHIVE_SIZE_MB * MIB,
            upload_slot_ttl_secs: UPLOAD_SLOT_TTL_SECS,
            import_concurrency: IMPORT_CONCURRENCY,
            transfer_max_retries: TRANSFER_MAX_RETRIES,
            transfer_retry_backoff_ms: TRANSFER_RETRY_BACKOFF_MS,
        }
    }
}

fn mib_to_bytes(name: &str, mb: u64) -> Result<u64, anyhow::Error> {
    mb.checked_mul(MIB)
        .ok_or_else(|| anyhow::anyhow!("{} is too large: {} MiB", name, mb))
}

impl ImportConfig {
    /// Load configuration from the environment (and `.env` when present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => Some(value.parse::<StorageBackend>()?),
            Err(_) => None,
        };

        let config = ImportConfig {
            environment,
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            max_model_size_bytes: mib_to_bytes(
                "MAX_MODEL_SIZE_MB",
                env::var("MAX_MODEL_SIZE_MB")
                    .unwrap_or_else(|_| MAX_MODEL_SIZE_MB.to_string())
                    .parse::<u64>()
                    .unwrap_or(MAX_MODEL_SIZE_MB),
            )?,
            max_slice_size_bytes: mib_to_bytes(
                "MAX_SLICE_SIZE_MB",
                env::var("MAX_SLICE_SIZE_MB")
                    .unwrap_or_else(|_| MAX_SLICE_SIZE_MB.to_string())
                    .parse::<u64>()
                    .unwrap_or(MAX_SLICE_SIZE_MB),
            )?,
            max_archive_size_bytes: mib_to_bytes(
                "MAX_ARCHIVE_SIZE_MB",
                env::var("MAX_ARCHIVE_SIZE_MB")
                    .unwrap_or_else(|_| MAX_ARCHIVE_SIZE_MB.to_string())
                    .parse::<u64>()
                    .unwrap_or(MAX_ARCHIVE_SIZE_MB),
            )?,
            upload_slot_ttl_secs: env::var("UPLOAD_SLOT_TTL_SECS")
                .unwrap_or_else(|_| UPLOAD_SLOT_TTL_SECS.to_string())
                .parse()
                .unwrap_or(UPLOAD_SLOT_TTL_SECS),
            import_concurrency: env::var("IMPORT_CONCURRENCY")
                .unwrap_or_else(|_| IMPORT_CONCURRENCY.to_string())
                .parse()
                .unwrap_or(IMPORT_CONCURRENCY),
            transfer_max_retries: env::var("TRANSFER_MAX_RETRIES")
                .unwrap_or_else(|_| TRANSFER_MAX_RETRIES.to_string())
                .parse()
                .unwrap_or(TRANSFER_MAX_RETRIES),
            transfer_retry_backoff_ms: env::var("TRANSFER_RETRY_BACKOFF_MS")
                .unwrap_or_else(|_| TRANSFER_RETRY_BACKOFF_MS.to_string())
                .parse()
                .unwrap_or(TRANSFER_RETRY_BACKOFF_MS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if let Some(ref url) = self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.import_concurrency == 0 {
            return Err(anyhow::anyhow!("IMPORT_CONCURRENCY must be at least 1"));
        }

        if self.upload_slot_ttl_secs == 0 {
            return Err(anyhow::anyhow!("UPLOAD_SLOT_TTL_SECS must be at least 1"));
        }

        let backend = self.storage_backend.unwrap_or(StorageBackend::S3);
        match backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage_backend.unwrap_or(StorageBackend::S3)
    }

    pub fn upload_slot_ttl(&self) -> Duration {
        Duration::from_secs(self.upload_slot_ttl_secs)
    }

    pub fn transfer_retry_backoff(&self) -> Duration {
        Duration::from_millis(self.transfer_retry_backoff_ms)
    }
}
