//! Single-file upload protocol
//!
//! Three phases per file: request a slot (validate, pick a key, get a destination), transfer
//! the bytes directly to the destination, then confirm so the record is persisted. A failed
//! confirmation deletes the uploaded object before reporting the failure.

pub mod protocol;
pub mod service;
pub mod transfer;

pub use protocol::{SingleFileUpload, UploadPhase};
pub use service::{SlotRequest, UploadService, UploadSlot};
pub use transfer::{DirectTransfer, RetryPolicy, TransferClient, TRANSFER_CHUNK_SIZE};
