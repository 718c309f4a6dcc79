//! Client side of the upload protocol: moving bytes to the destination.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use printvault_core::ImportConfig;
use printvault_storage::{Storage, UploadDestination};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};

use crate::error::TransferError;
use crate::progress::FileProgress;

/// Body chunk size; progress is reported once per chunk.
pub const TRANSFER_CHUNK_SIZE: usize = 64 * 1024;

/// Writes a file's bytes to an upload destination.
#[async_trait]
pub trait DirectTransfer: Send + Sync {
    async fn transfer(
        &self,
        destination: &UploadDestination,
        body: Bytes,
        progress: FileProgress,
    ) -> Result<(), TransferError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first; zero disables retries
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each one after
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            max_retries: config.transfer_max_retries,
            backoff: config.transfer_retry_backoff(),
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Transfers over HTTP `PUT` for presigned destinations, and through the storage capability
/// for backends that cannot presign.
pub struct TransferClient {
    http: reqwest::Client,
    storage: Arc<dyn Storage>,
    retry: RetryPolicy,
}

impl TransferClient {
    pub fn new(http: reqwest::Client, storage: Arc<dyn Storage>, retry: RetryPolicy) -> Self {
        Self {
            http,
            storage,
            retry,
        }
    }

    async fn put_presigned(
        &self,
        url: &str,
        content_type: &str,
        body: Bytes,
        progress: &FileProgress,
    ) -> Result<(), TransferError> {
        let length = body.len();
        let response = self
            .http
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, length)
            .body(reqwest::Body::wrap_stream(chunked_body(body, progress.clone())))
            .send()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::Status {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    async fn attempt(
        &self,
        destination: &UploadDestination,
        body: Bytes,
        progress: &FileProgress,
    ) -> Result<(), TransferError> {
        match destination {
            UploadDestination::PresignedPut {
                url, content_type, ..
            } => self.put_presigned(url, content_type, body, progress).await,
            UploadDestination::Backend {
                storage_key,
                content_type,
            } => {
                let length = body.len() as u64;
                self.storage
                    .upload_with_key(storage_key, body.to_vec(), content_type)
                    .await?;
                progress.advance(length);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl DirectTransfer for TransferClient {
    async fn transfer(
        &self,
        destination: &UploadDestination,
        body: Bytes,
        progress: FileProgress,
    ) -> Result<(), TransferError> {
        let start = Instant::now();
        let mut attempt = 0;

        loop {
            match self.attempt(destination, body.clone(), &progress).await {
                Ok(()) => {
                    tracing::debug!(
                        storage_key = %destination.storage_key(),
                        size_bytes = body.len(),
                        attempts = attempt + 1,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "Transfer complete"
                    );
                    return Ok(());
                }
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        error = %e,
                        storage_key = %destination.storage_key(),
                        attempt = attempt + 1,
                        retry_in_ms = delay.as_millis() as u64,
                        "Transfer failed, retrying"
                    );
                    progress.rewind();
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Split the body into chunks that report progress as the HTTP client pulls them.
fn chunked_body(
    body: Bytes,
    progress: FileProgress,
) -> impl futures::Stream<Item = Result<Bytes, std::io::Error>> + Send + Sync + 'static {
    let length = body.len();
    futures::stream::iter((0..length).step_by(TRANSFER_CHUNK_SIZE).map(move |offset| {
        let end = usize::min(offset + TRANSFER_CHUNK_SIZE, length);
        let chunk = body.slice(offset..end);
        progress.advance(chunk.len() as u64);
        Ok(chunk)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MockStorage;
    use chrono::Utc;
    use futures::StreamExt;

    fn presigned(url: String) -> UploadDestination {
        UploadDestination::PresignedPut {
            url,
            storage_key: "models/a.stl".to_string(),
            content_type: "model/stl".to_string(),
            expires_at: Utc::now(),
        }
    }

    fn client(retry: RetryPolicy) -> TransferClient {
        TransferClient::new(reqwest::Client::new(), Arc::new(MockStorage::new()), retry)
    }

    #[tokio::test]
    async fn test_chunked_body_reports_each_chunk() {
        let progress = FileProgress::noop();
        let body = Bytes::from(vec![7u8; TRANSFER_CHUNK_SIZE * 2 + 10]);

        let chunks: Vec<Bytes> = chunked_body(body, progress.clone())
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].len(), 10);
        assert_eq!(progress.reported(), (TRANSFER_CHUNK_SIZE * 2 + 10) as u64);
    }

    #[tokio::test]
    async fn test_put_to_presigned_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/upload")
            .match_header("content-type", "model/stl")
            .match_body("solid cube")
            .with_status(200)
            .create_async()
            .await;

        let progress = FileProgress::noop();
        client(RetryPolicy::none())
            .transfer(
                &presigned(format!("{}/upload", server.url())),
                Bytes::from_static(b"solid cube"),
                progress.clone(),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(progress.reported(), 10);
    }

    #[tokio::test]
    async fn test_non_success_status_fails() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/upload")
            .with_status(403)
            .create_async()
            .await;

        let err = client(RetryPolicy::none())
            .transfer(
                &presigned(format!("{}/upload", server.url())),
                Bytes::from_static(b"x"),
                FileProgress::noop(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::Status { status: 403 }));
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_until_exhausted() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/upload")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let progress = FileProgress::noop();
        let err = client(RetryPolicy {
            max_retries: 2,
            backoff: Duration::from_millis(1),
        })
        .transfer(
            &presigned(format!("{}/upload", server.url())),
            Bytes::from_static(b"abc"),
            progress.clone(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, TransferError::Status { status: 503 }));
        mock.assert_async().await;
        // Earlier attempts are rewound; at most the last attempt's bytes remain.
        assert!(progress.reported() <= 3);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/upload")
            .with_status(400)
            .expect(1)
            .create_async()
            .await;

        let result = client(RetryPolicy {
            max_retries: 3,
            backoff: Duration::from_millis(1),
        })
        .transfer(
            &presigned(format!("{}/upload", server.url())),
            Bytes::from_static(b"abc"),
            FileProgress::noop(),
        )
        .await;

        assert!(result.is_err());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_backend_destination_writes_through_storage() {
        let storage = Arc::new(MockStorage::new());
        let client = TransferClient::new(reqwest::Client::new(), storage.clone(), RetryPolicy::none());
        let destination = UploadDestination::Backend {
            storage_key: "images/a.png".to_string(),
            content_type: "image/png".to_string(),
        };

        let progress = FileProgress::noop();
        client
            .transfer(&destination, Bytes::from_static(b"png"), progress.clone())
            .await
            .unwrap();

        assert_eq!(storage.get_file("images/a.png"), Some(b"png".to_vec()));
        assert_eq!(progress.reported(), 3);
    }

    #[test]
    fn test_backoff_doubles() {
        let retry = RetryPolicy {
            max_retries: 3,
            backoff: Duration::from_millis(100),
        };
        assert_eq!(retry.delay_for(0), Duration::from_millis(100));
        assert_eq!(retry.delay_for(2), Duration::from_millis(400));
    }
}
