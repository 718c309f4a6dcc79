//! Asset record model: what the persistence layer stores for each uploaded file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

/// Kind of printing asset a file represents, decided from its filename alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Model,
    Image,
    Slice,
    Unknown,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Model => "model",
            FileType::Image => "image",
            FileType::Slice => "slice",
            FileType::Unknown => "unknown",
        }
    }

    /// Top-level storage prefix for objects of this kind.
    pub fn storage_prefix(&self) -> &'static str {
        match self {
            FileType::Model => "models",
            FileType::Image => "images",
            FileType::Slice => "slices",
            FileType::Unknown => "misc",
        }
    }
}

impl Display for FileType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "model" => Ok(FileType::Model),
            "image" => Ok(FileType::Image),
            "slice" => Ok(FileType::Slice),
            "unknown" => Ok(FileType::Unknown),
            _ => Err(anyhow::anyhow!("Invalid file type: {}", s)),
        }
    }
}

/// Data needed to persist an asset once its bytes are in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssetRecord {
    pub kind: FileType,
    pub filename: String,
    pub storage_key: String,
    pub public_url: String,
    pub size: u64,
    pub content_type: String,
}

/// A persisted asset record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub id: Uuid,
    pub kind: FileType,
    pub filename: String,
    pub storage_key: String,
    pub public_url: String,
    pub size: u64,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}
