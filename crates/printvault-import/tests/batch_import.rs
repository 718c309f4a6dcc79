use std::sync::Arc;
use std::time::Duration;

use mockito::Matcher;
use printvault_core::{ExtractedFile, FileType, UploadPolicy};
use printvault_import::test_helpers::{build_zip, MockAssetStore, MockStorage, RecordingTransfer};
use printvault_import::{
    BatchImporter, BatchProgress, DirectTransfer, Extractor, RetryPolicy, Selection,
    TransferClient, UploadService,
};
use printvault_storage::{LocalStorage, Storage};
use tempfile::TempDir;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

fn service(storage: Arc<dyn Storage>, store: Arc<MockAssetStore>, max_size: u64) -> Arc<UploadService> {
    Arc::new(UploadService::new(
        storage,
        store,
        UploadPolicy::bulk_import(max_size),
        Duration::from_secs(900),
    ))
}

fn model(path: &str, content: &[u8]) -> ExtractedFile {
    ExtractedFile::new(path, FileType::Model, content.to_vec())
}

#[tokio::test]
async fn test_persistence_failure_cleans_up_only_that_entry() {
    let storage = Arc::new(MockStorage::new());
    let store = Arc::new(MockAssetStore::new());
    store.fail_on_filename("second.stl");

    let importer = BatchImporter::new(
        service(storage.clone(), store.clone(), 1024),
        Arc::new(RecordingTransfer::new(storage.clone())),
        3,
    );

    let files = vec![
        model("first.stl", b"one"),
        model("second.stl", b"two"),
        model("third.stl", b"three"),
    ];
    let result = importer
        .import_selected(files, None, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.imported.len(), 2);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].filename, "second.stl");
    assert_eq!(result.failed[0].error_code, "PERSISTENCE_FAILED");

    let deleted = storage.deleted_keys();
    assert_eq!(deleted.len(), 1);
    assert!(!storage.has_file(&deleted[0]));
    assert!(store.records().iter().all(|r| r.storage_key != deleted[0]));
    assert_eq!(storage.file_count(), 2);
}

#[tokio::test]
async fn test_mixed_failures_account_for_every_entry() {
    let storage = Arc::new(MockStorage::new());
    let store = Arc::new(MockAssetStore::new());
    store.fail_on_filename("unsaved.png");

    let importer = BatchImporter::new(
        service(storage.clone(), store.clone(), 8),
        Arc::new(RecordingTransfer::new(storage.clone())),
        2,
    );

    let files = vec![
        model("ok.stl", b"fine"),
        model("huge.stl", b"far too many bytes"),
        ExtractedFile::new("notes.txt", FileType::Unknown, b"text".to_vec()),
        ExtractedFile::new("unsaved.png", FileType::Image, b"png".to_vec()),
        ExtractedFile::new("ok.jpg", FileType::Image, b"jpg".to_vec()),
    ];
    let result = importer
        .import_selected(files, None, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.imported.len() + result.failed.len(), 5);
    assert_eq!(result.summary.succeeded, 2);
    assert_eq!(result.summary.total_bytes, 4 + 3);

    let mut codes: Vec<&str> = result.failed.iter().map(|f| f.error_code.as_str()).collect();
    codes.sort_unstable();
    assert_eq!(codes, vec!["PERSISTENCE_FAILED", "VALIDATION_ERROR", "VALIDATION_ERROR"]);
    assert_eq!(store.records().len(), 2);
}

#[tokio::test]
async fn test_transfer_failures_never_escape() {
    let storage = Arc::new(MockStorage::new());
    let store = Arc::new(MockAssetStore::new());

    let importer = BatchImporter::new(
        service(storage.clone(), store.clone(), 1024),
        Arc::new(RecordingTransfer::failing(storage.clone(), 503)),
        4,
    );

    let files = vec![model("a.stl", b"a"), model("b.stl", b"b")];
    let result = importer
        .import_selected(files, None, CancellationToken::new())
        .await
        .unwrap();

    assert!(result.all_failed());
    assert!(result.failed.iter().all(|f| f.error_code == "TRANSFER_FAILED"));
    assert!(store.records().is_empty());
}

#[tokio::test]
async fn test_double_dot_in_leaf_name_imports() {
    let storage = Arc::new(MockStorage::new());
    let store = Arc::new(MockAssetStore::new());

    let importer = BatchImporter::new(
        service(storage.clone(), store.clone(), 1024),
        Arc::new(RecordingTransfer::new(storage.clone())),
        1,
    );

    let files = vec![model("kit/bracket..v2.stl", b"solid")];
    let result = importer
        .import_selected(files, None, CancellationToken::new())
        .await
        .unwrap();

    assert!(result.failed.is_empty());
    assert_eq!(result.imported.len(), 1);
    assert_eq!(store.records()[0].filename, "bracket..v2.stl");
}

#[tokio::test]
async fn test_backend_write_failure_leaves_no_record() {
    let storage = Arc::new(MockStorage::new());
    storage.fail_uploads(true);
    let store = Arc::new(MockAssetStore::new());

    let transfer = TransferClient::new(reqwest::Client::new(), storage.clone(), RetryPolicy::none());
    let importer = BatchImporter::new(
        service(storage.clone(), store.clone(), 1024),
        Arc::new(transfer),
        2,
    );

    let files = vec![model("a.stl", b"a"), model("b.3mf", b"b")];
    let result = importer
        .import_selected(files, None, CancellationToken::new())
        .await
        .unwrap();

    assert!(result.all_failed());
    assert_eq!(result.failed.len(), 2);
    assert!(result.failed.iter().all(|f| f.error_code == "TRANSFER_FAILED"));
    assert_eq!(storage.slot_requests(), 2);
    assert_eq!(storage.file_count(), 0);
    assert!(store.records().is_empty());
    assert!(storage.deleted_keys().is_empty());
}

#[tokio::test]
async fn test_archive_to_local_storage_end_to_end() {
    let dir = TempDir::new().unwrap();
    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(dir.path(), "http://localhost:3000/files".to_string())
            .await
            .unwrap(),
    );
    let store = Arc::new(MockAssetStore::new());

    let bytes = build_zip(&[
        ("kit/base.stl", b"solid base"),
        ("kit/photo.PNG", b"png bytes"),
        ("kit/readme.md", b"# kit"),
        ("kit/skip.3mf", b"3mf"),
    ]);
    let extracted = Extractor::default().extract(&bytes, None).unwrap();
    assert_eq!(extracted.total_files(), 3);

    let mut selection = Selection::new(extracted);
    selection.toggle("kit/skip.3mf");
    let files = selection.into_selected();

    let transfer: Arc<dyn DirectTransfer> = Arc::new(TransferClient::new(
        reqwest::Client::new(),
        storage.clone(),
        RetryPolicy::none(),
    ));
    let importer = BatchImporter::new(service(storage.clone(), store.clone(), 1024), transfer, 2);
    let (tx, rx) = watch::channel(BatchProgress::default());

    let result = importer
        .import_selected(files, Some(tx), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.summary.succeeded, 2);
    assert!(result.failed.is_empty());
    assert_eq!(rx.borrow().uploaded_bytes, 10 + 9);

    for record in store.records() {
        let content = storage.download(&record.storage_key).await.unwrap();
        assert_eq!(content.len() as u64, record.size);
        assert!(record.public_url.starts_with("http://localhost:3000/files/"));
        match record.kind {
            FileType::Model => {
                assert!(record.storage_key.starts_with("models/"));
                assert_eq!(content, b"solid base");
            }
            FileType::Image => {
                assert!(record.storage_key.starts_with("images/"));
                assert!(record.storage_key.ends_with(".png"));
                assert_eq!(record.content_type, "image/png");
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_presigned_destinations_receive_put() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PUT", Matcher::Regex(r"^/models/[0-9a-f-]+\.stl$".to_string()))
        .match_header("content-type", "model/stl")
        .with_status(200)
        .expect(2)
        .create_async()
        .await;

    let storage = Arc::new(MockStorage::presigned(server.url()));
    let store = Arc::new(MockAssetStore::new());
    let transfer = Arc::new(TransferClient::new(
        reqwest::Client::new(),
        storage.clone(),
        RetryPolicy::none(),
    ));
    let importer = BatchImporter::new(service(storage.clone(), store.clone(), 1024), transfer, 2);

    let result = importer
        .import_selected(
            vec![model("a.stl", b"solid a"), model("b.stl", b"solid b")],
            None,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.summary.succeeded, 2);
    assert_eq!(store.records().len(), 2);
    // Presigned writes bypass the storage capability.
    assert_eq!(storage.file_count(), 0);
}

#[tokio::test]
async fn test_batch_result_json_shape() {
    let storage = Arc::new(MockStorage::new());
    let store = Arc::new(MockAssetStore::new());
    store.fail_on_filename("b.stl");
    let importer = BatchImporter::new(
        service(storage.clone(), store, 1024),
        Arc::new(RecordingTransfer::new(storage)),
        1,
    );

    let result = importer
        .import_selected(
            vec![model("a.stl", b"a"), model("b.stl", b"b")],
            None,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["summary"]["total"], 2);
    assert_eq!(json["summary"]["succeeded"], 1);
    assert_eq!(json["imported"][0]["type"], "model");
    assert!(json["imported"][0]["id"].is_string());
    assert_eq!(json["failed"][0]["errorCode"], "PERSISTENCE_FAILED");
    assert_eq!(json["failed"][0]["filename"], "b.stl");
}
