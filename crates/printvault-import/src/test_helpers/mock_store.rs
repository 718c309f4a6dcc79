//! Mock asset store for testing

use async_trait::async_trait;
use chrono::Utc;
use printvault_core::{AppError, AssetRecord, NewAssetRecord};
use printvault_db::AssetStore;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Keeps created records in memory; selected filenames fail to persist.
#[derive(Default)]
pub struct MockAssetStore {
    records: Arc<Mutex<Vec<AssetRecord>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl MockAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create_record` fail for every record with this filename
    pub fn fail_on_filename(&self, filename: &str) {
        self.failing.lock().unwrap().insert(filename.to_string());
    }

    pub fn records(&self) -> Vec<AssetRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetStore for MockAssetStore {
    async fn create_record(&self, record: NewAssetRecord) -> Result<AssetRecord, AppError> {
        if self.failing.lock().unwrap().contains(&record.filename) {
            return Err(AppError::Internal(format!(
                "simulated insert failure for {}",
                record.filename
            )));
        }

        let created = AssetRecord {
            id: Uuid::new_v4(),
            kind: record.kind,
            filename: record.filename,
            storage_key: record.storage_key,
            public_url: record.public_url,
            size: record.size,
            content_type: record.content_type,
            created_at: Utc::now(),
        };
        self.records.lock().unwrap().push(created.clone());
        Ok(created)
    }
}
