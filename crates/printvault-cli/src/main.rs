//! printvault-import: bulk-import 3D print models and images from a zip archive.
//!
//! Configuration comes from the environment (see `ImportConfig`). Logs go to stderr,
//! the manifest or import result to stdout.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use clap::Parser;
use printvault_cli::{init_tracing, print_manifest, print_result, OutputFormat};
use printvault_core::{ExtractionResult, FileType, ImportConfig};
use printvault_db::{create_pool, run_migrations, AssetRepository};
use printvault_import::{
    progress_channel, BatchImporter, BatchProgress, ExtractOptions, Extractor, RetryPolicy,
    Selection, TransferClient, UploadService,
};
use printvault_storage::create_storage;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "printvault-import")]
#[command(about = "Import 3D models and images from a zip archive into the asset library")]
struct Args {
    /// Path to the zip archive
    archive: PathBuf,

    /// Deselect an archive path before importing (repeatable)
    #[arg(long, value_name = "PATH")]
    exclude: Vec<String>,

    /// Import only model files
    #[arg(long)]
    models_only: bool,

    /// Extract and print the manifest without uploading anything
    #[arg(long)]
    dry_run: bool,

    /// Maximum concurrent uploads (defaults to IMPORT_CONCURRENCY)
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let args = Args::parse();

    let config = if args.dry_run {
        // Storage and database settings are irrelevant to a dry run.
        ImportConfig::from_env().unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Using default limits for dry run");
            ImportConfig::default()
        })
    } else {
        ImportConfig::from_env().context("Invalid configuration")?
    };

    let bytes = tokio::fs::read(&args.archive)
        .await
        .with_context(|| format!("Failed to read {}", args.archive.display()))?;

    let mut selection = Selection::new(extract(&config, Bytes::from(bytes)).await?);
    apply_toggles(&mut selection, &args);

    if args.dry_run {
        print_manifest(&selection, args.format)?;
        return Ok(ExitCode::SUCCESS);
    }

    let files = selection.into_selected();
    if files.is_empty() {
        tracing::warn!("Nothing selected for import");
        return Ok(ExitCode::SUCCESS);
    }

    let storage = create_storage(&config)
        .await
        .context("Failed to initialize storage")?;
    let backend = storage.backend_type();
    tracing::info!(
        environment = %config.environment,
        backend = %backend,
        presigned = backend.supports_presigned_upload(),
        "Storage ready"
    );
    let pool = create_pool(&config).await?;
    run_migrations(&pool).await?;

    let service = Arc::new(UploadService::bulk_import(
        storage.clone(),
        Arc::new(AssetRepository::new(pool)),
        &config,
    ));
    let transfer = Arc::new(TransferClient::new(
        reqwest::Client::new(),
        storage,
        RetryPolicy::from_config(&config),
    ));
    let importer = BatchImporter::new(
        service,
        transfer,
        args.concurrency.unwrap_or(config.import_concurrency),
    );

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let (progress_tx, progress_rx) = watch::channel(BatchProgress::default());
    let reporter = tokio::spawn(report_batch_progress(progress_rx));

    let result = importer
        .import_selected(files, Some(progress_tx), cancel)
        .await?;
    // The sender is gone once the batch returns, which ends the reporter.
    let _ = reporter.await;

    print_result(&result, args.format)?;

    if result.all_failed() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

async fn extract(config: &ImportConfig, bytes: Bytes) -> anyhow::Result<ExtractionResult> {
    let (tx, mut rx) = progress_channel();
    let reporter = tokio::spawn(async move {
        let mut last_percent = 0;
        while let Some(event) = rx.recv().await {
            if event.percent >= last_percent + 10 || event.percent == 100 {
                last_percent = event.percent;
                tracing::info!(
                    processed = event.processed,
                    total = event.total,
                    percent = event.percent,
                    "Extracting archive"
                );
            }
        }
    });

    let extractor = Extractor::new(ExtractOptions::from_config(config));
    let result = extractor
        .extract_blocking(bytes, Some(tx))
        .await
        .context("Failed to extract archive")?;
    let _ = reporter.await;

    Ok(result)
}

fn apply_toggles(selection: &mut Selection, args: &Args) {
    for path in &args.exclude {
        if selection.is_selected(path) {
            selection.toggle(path);
        } else {
            tracing::warn!(path = %path, "Excluded path is not in the archive manifest");
        }
    }

    if args.models_only {
        let images: Vec<String> = selection
            .manifest()
            .iter()
            .filter(|f| f.file_type != FileType::Model && selection.is_selected(&f.path))
            .map(|f| f.path.clone())
            .collect();
        for path in images {
            selection.toggle(&path);
        }
    }
}

fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing in-flight uploads");
            cancel.cancel();
        }
    });
}

async fn report_batch_progress(mut rx: watch::Receiver<BatchProgress>) {
    while rx.changed().await.is_ok() {
        let progress = *rx.borrow_and_update();
        tracing::debug!(
            uploaded_bytes = progress.uploaded_bytes,
            total_bytes = progress.total_bytes,
            completed = progress.completed,
            total_files = progress.total_files,
            "Upload progress"
        );
    }
}
