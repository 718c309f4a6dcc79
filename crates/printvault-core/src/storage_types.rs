use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Object storage backends an import can write to.
///
/// Defined in core because configuration selects it and the storage crate implements it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

impl StorageBackend {
    /// Whether clients can write directly to the backend through a presigned URL.
    ///
    /// Backends without presigning receive the bytes through the storage capability instead.
    pub fn supports_presigned_upload(&self) -> bool {
        matches!(self, StorageBackend::S3)
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_from_str() {
        assert_eq!("s3".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert_eq!(" LOCAL ".parse::<StorageBackend>().unwrap(), StorageBackend::Local);
        assert!("nfs".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_presigned_support() {
        assert!(StorageBackend::S3.supports_presigned_upload());
        assert!(!StorageBackend::Local.supports_presigned_upload());
    }
}
