// src/bin/folioscan.rs

//! # FolioScan
//!
//! Command-line front end for the scanned-document pipeline. It
//!
//! 1.  reads the given PDFs (or directories of PDFs) into a session,
//! 2.  classifies, extracts and normalizes them one file at a time against the
//!     configured vision service, with pacing between files,
//! 3.  optionally retries every document that failed,
//! 4.  writes `results.json`, one Parquet table per document type and a folder
//!     per type holding the input files renamed to their derived `archivo`.
//!
//! Ctrl-C stops the batch before the next file; the files already processed
//! are still sorted and exported.

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};
use FolioScan::config::{load_run_config, Args, RunConfig};
use FolioScan::data_model::{DocumentType, ProcessingOutcome};
use FolioScan::error::{PipelineError, Result};
use FolioScan::executor::{BatchExecutor, BatchObserver, BatchSummary, CancelHandle};
use FolioScan::pipeline::classifier::ServiceClassifier;
use FolioScan::pipeline::extractors::ExtractorSet;
use FolioScan::pipeline::pacing::build_pacer;
use FolioScan::pipeline::readers::PdfReader;
use FolioScan::pipeline::vision::HttpVisionClient;
use FolioScan::pipeline::writers::{
    pair_with_files, BaseWriter, DirectoryArchive, JsonResultsWriter, ParquetWriter,
};
use FolioScan::session::{BatchProgress, SessionStore};
use FolioScan::utils::common::setup_prometheus_metrics;

fn create_progress_bar(total_items: u64, message: &str, template: &str) -> ProgressBar {
    let pb = if total_items == 0 {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::new(total_items)
    };
    pb.set_message(message.to_string());
    pb.set_style(
        ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb
}

/// Drives an indicatif bar from batch notifications.
struct ProgressObserver {
    bar: ProgressBar,
}

impl BatchObserver for ProgressObserver {
    fn on_progress(&self, progress: &BatchProgress) {
        self.bar
            .set_position(progress.current.saturating_sub(1) as u64);
    }

    fn on_results(&self, documents: &[ProcessingOutcome]) {
        let failed = documents.iter().filter(|o| o.is_failure()).count();
        self.bar.set_position(documents.len() as u64);
        self.bar.set_message(format!("{} failed", failed));
    }

    fn on_finished(&self, summary: &BatchSummary) {
        self.bar.finish_with_message(format!(
            "{} ok, {} failed in {}",
            summary.succeeded,
            summary.failed,
            HumanDuration(summary.elapsed)
        ));
    }
}

/// Stdout logging, JSON when asked, plus an optional daily-rotated JSON file.
/// The returned guard must live until exit so buffered file logs get flushed.
fn init_tracing(json: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = if json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "folioscan.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .with(filter)
        .init();
    guard
}

fn load_config(args: &Args) -> Result<RunConfig> {
    let config = match &args.config {
        Some(path) => {
            info!("Loading run configuration from {}", path.display());
            load_run_config(path)?
        }
        None => {
            info!("No configuration file given. Using defaults.");
            RunConfig::default()
        }
    };
    config.validate()?;
    Ok(config)
}

/// Writes every enabled output. Archive failures for one type do not stop the
/// other outputs; the first one is returned after everything else is written.
async fn export_results(args: &Args, config: &RunConfig, store: &SessionStore) -> Result<()> {
    let documents = store.documents().await;
    let files = store.files().await;
    std::fs::create_dir_all(&args.output_dir)?;

    if config.export.results_json {
        let mut writer = JsonResultsWriter::new(args.output_dir.join("results.json"));
        writer.write_batch(&documents)?;
        writer.close()?;
    }

    if config.export.parquet {
        let mut writer = ParquetWriter::new(&args.output_dir)?;
        writer.write_batch(&documents)?;
        writer.close()?;
    }

    let mut archive_error: Option<PipelineError> = None;
    if config.export.archive {
        let archive = DirectoryArchive::new(&args.output_dir);
        for document_type in DocumentType::ALL {
            let pairs = pair_with_files(document_type, &documents, &files);
            if pairs.is_empty() {
                continue;
            }
            if let Err(e) = archive.write(document_type, &pairs) {
                error!(error = %e, "Archive generation failed");
                archive_error.get_or_insert(e);
            }
        }
    }

    match archive_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_tracing(args.json_logs, args.log_dir.as_deref());

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e);
        }
    };
    if args.validate_config {
        info!("Configuration is valid.");
        return Ok(());
    }

    if let Err(e) = setup_prometheus_metrics(args.metrics_port).await {
        error!("Failed to start Prometheus metrics endpoint: {}", e);
    }

    let files = PdfReader::new(args.inputs.clone()).read_all()?;
    if files.is_empty() {
        warn!("No PDF files found in the given inputs. Exiting.");
        return Ok(());
    }
    info!("Loaded {} input files", files.len());

    let client = Arc::new(HttpVisionClient::from_env(&config.service)?);
    let executor = BatchExecutor::new(
        Arc::new(ServiceClassifier::new(client.clone())),
        Arc::new(ExtractorSet::service_backed(client)),
        build_pacer(&config.pacing),
    );

    let total = files.len() as u64;
    let store = SessionStore::new(files);
    let cancel = CancelHandle::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received. Stopping after the current file.");
                cancel.cancel();
            }
        });
    }

    let observer = ProgressObserver {
        bar: create_progress_bar(
            total,
            "Processing",
            "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
        ),
    };
    let summary = executor.run_batch(&store, &observer, &cancel).await?;

    let mut recovered = 0;
    if args.retry_failed && summary.failed > 0 && !summary.cancelled {
        recovered = executor.retry_failed(&store).await?;
        info!("Retry recovered {} of {} failed documents", recovered, summary.failed);
    }

    let export_result = export_results(&args, &config, &store).await;
    let (succeeded, failed) = store.counts().await;

    info!("--------------------");
    info!("Batch Summary (run {}):", summary.run_id);
    info!("  Input files: {}", summary.total);
    info!("  Processed: {}", summary.processed());
    info!("    - Succeeded: {}", succeeded);
    info!("    - Failed: {}", failed);
    if args.retry_failed {
        info!("    - Recovered by retry: {}", recovered);
    }
    if summary.cancelled {
        info!("  Cancelled: {} files skipped", summary.total - summary.processed());
    }
    info!("  Elapsed: {}", HumanDuration(summary.elapsed));
    info!("  Output directory: {}", args.output_dir.display());
    info!("--------------------");

    export_result
}
