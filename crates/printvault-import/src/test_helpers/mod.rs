//! In-memory fakes and zip fixtures shared by unit and integration tests.

mod fixtures;
mod mock_storage;
mod mock_store;
mod recording_transfer;

pub use fixtures::{build_zip, patch_declared_size, ZipFixture};
pub use mock_storage::MockStorage;
pub use mock_store::MockAssetStore;
pub use recording_transfer::RecordingTransfer;
