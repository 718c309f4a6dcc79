//! Shared key generation and validation for storage backends.

use printvault_core::FileType;
use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

/// Generate a fresh storage key: `{kind prefix}/{uuid}{suffix}`.
///
/// `suffix` is the matched extension including its dot (`.stl`, `.gcode.3mf`). The original
/// filename is kept on the asset record, not in the key.
pub fn generate_storage_key(file_type: FileType, suffix: &str) -> String {
    format!(
        "{}/{}{}",
        file_type.storage_prefix(),
        Uuid::new_v4(),
        suffix.to_lowercase()
    )
}

/// Reject keys that could escape the bucket or base directory.
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if storage_key.contains("..") || storage_key.starts_with('/') || storage_key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
