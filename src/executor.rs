use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, error, info, info_span, instrument, warn, Instrument};
use uuid::Uuid;

use crate::data_model::{Classification, InputFile, ProcessedDocument, ProcessingOutcome};
use crate::error::{PipelineError, Result};
use crate::pipeline::classifier::DocumentClassifier;
use crate::pipeline::extractors::ExtractorSet;
use crate::pipeline::normalizer::normalize;
use crate::pipeline::pacing::Pacer;
use crate::pipeline::sorter::sort_by_document_date;
use crate::session::{BatchProgress, DocumentFilter, SessionStore};
use crate::utils::prometheus_metrics::{
    ACTIVE_DOCUMENTS_IN_FLIGHT, DOCUMENTS_FAILED_TOTAL, DOCUMENTS_PROCESSED_TOTAL,
    DOCUMENTS_SUCCEEDED_TOTAL, DOCUMENT_PROCESSING_DURATION_SECONDS, RETRIES_ATTEMPTED_TOTAL,
    RETRIES_SUCCEEDED_TOTAL, RETRY_LOOKUP_FAILURES_TOTAL,
};

/// Receives batch notifications. Every method defaults to doing nothing.
pub trait BatchObserver: Send + Sync {
    fn on_progress(&self, _progress: &BatchProgress) {}

    /// Called with the whole current sequence after each file and once more
    /// with the sorted sequence at the end of the run.
    fn on_results(&self, _documents: &[ProcessingOutcome]) {}

    fn on_finished(&self, _summary: &BatchSummary) {}
}

pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// Stops a running batch before its next file. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub run_id: Uuid,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Set when the run stopped early; skipped files have no slot.
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStatus {
    Succeeded,
    Failed,
    /// No input file matched, or the slot vanished while the retry ran.
    Skipped,
}

fn step_error(step_name: &str, source: PipelineError) -> PipelineError {
    PipelineError::StepError {
        step_name: step_name.to_string(),
        source: Box::new(source),
    }
}

async fn in_step<T>(step_name: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
    debug!("Running step: {}", step_name);
    fut.await.map_err(|e| step_error(step_name, e))
}

/// Runs files through classification, extraction and normalization, one at a
/// time, with the configured pacing between service calls.
pub struct BatchExecutor {
    classifier: Arc<dyn DocumentClassifier>,
    extractors: Arc<ExtractorSet>,
    pacer: Arc<dyn Pacer>,
}

impl BatchExecutor {
    pub fn new(
        classifier: Arc<dyn DocumentClassifier>,
        extractors: Arc<ExtractorSet>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        BatchExecutor {
            classifier,
            extractors,
            pacer,
        }
    }

    /// Classify, extract and normalize a single file.
    pub async fn process_file(&self, file: &InputFile) -> Result<ProcessedDocument> {
        let classification = self.classifier.classify(file).await.map_err(|e| {
            warn!(file = %file.name(), classifier = self.classifier.name(), error = %e, "Classifier call failed");
            step_error("classify", PipelineError::ClassificationFailed)
        })?;
        let document_type = match classification {
            Classification::Recognized(t) => t,
            Classification::Unknown => {
                return Err(step_error("classify", PipelineError::ClassificationFailed))
            }
        };

        let record = in_step("extract", self.extractors.get(document_type).extract(file)).await?;
        if record.document_type() != document_type {
            return Err(step_error(
                "extract",
                PipelineError::ExtractionFailed {
                    document_type,
                    message: format!("extractor returned a {} record", record.document_type()),
                },
            ));
        }

        Ok(normalize(record, file.name()))
    }

    /// Like [`process_file`](Self::process_file) but never fails: errors become
    /// a failed outcome carrying the file name and the cause.
    pub async fn process_outcome(&self, file: &InputFile) -> ProcessingOutcome {
        ACTIVE_DOCUMENTS_IN_FLIGHT.inc();
        let timer = DOCUMENT_PROCESSING_DURATION_SECONDS.start_timer();
        let result = self.process_file(file).await;
        timer.observe_duration();
        ACTIVE_DOCUMENTS_IN_FLIGHT.dec();
        DOCUMENTS_PROCESSED_TOTAL.inc();

        match result {
            Ok(document) => {
                DOCUMENTS_SUCCEEDED_TOTAL.inc();
                debug!(orden = %document.orden(), "Document processed");
                document.into()
            }
            Err(e) => {
                DOCUMENTS_FAILED_TOTAL.inc();
                match &e {
                    PipelineError::StepError { step_name, source } => {
                        error!(%step_name, error = %source, "Processing step failed")
                    }
                    other => error!(error = %other, "Unexpected processing error"),
                }
                ProcessingOutcome::failed(file.name(), e.document_message())
            }
        }
    }

    /// Processes every file in the session, publishing each result as it lands,
    /// then sorts the sequence by document date.
    ///
    /// Previous results are discarded when the run starts. Fails only if
    /// another batch is already running on the same store.
    pub async fn run_batch(
        &self,
        store: &SessionStore,
        observer: &dyn BatchObserver,
        cancel: &CancelHandle,
    ) -> Result<BatchSummary> {
        let run_id = Uuid::new_v4();
        let started_at = Instant::now();
        let files = store
            .update(|s| {
                if s.progress.is_some() {
                    return Err(PipelineError::Unexpected(
                        "A batch is already running on this session".to_string(),
                    ));
                }
                s.documents.clear();
                s.progress = Some(BatchProgress {
                    current: 0,
                    total: s.files.len(),
                    started_at,
                });
                Ok(s.files.clone())
            })
            .await?;
        let total = files.len();

        let run_span = info_span!("batch_run", %run_id, total);
        let summary = async {
            info!(pacer = self.pacer.name(), "Starting batch of {} files", total);
            let mut cancelled = false;

            for (i, file) in files.iter().enumerate() {
                if i > 0 {
                    self.pacer.pace().await;
                }
                if cancel.is_cancelled() {
                    warn!(remaining = total - i, "Batch cancelled before file {}", i + 1);
                    cancelled = true;
                    break;
                }

                let progress = BatchProgress {
                    current: i + 1,
                    total,
                    started_at,
                };
                store.update(|s| s.progress = Some(progress)).await;
                observer.on_progress(&progress);

                let outcome = self
                    .process_outcome(file)
                    .instrument(info_span!("process_file", index = i, file = %file.name()))
                    .await;
                let published = store
                    .update(|s| {
                        s.documents.push(outcome);
                        s.documents.clone()
                    })
                    .await;
                observer.on_results(&published);
            }

            let sorted = store
                .update(|s| {
                    s.documents = sort_by_document_date(std::mem::take(&mut s.documents));
                    s.progress = None;
                    s.documents.clone()
                })
                .await;
            observer.on_results(&sorted);

            let failed = sorted.iter().filter(|o| o.is_failure()).count();
            let summary = BatchSummary {
                run_id,
                total,
                succeeded: sorted.len() - failed,
                failed,
                cancelled,
                elapsed: started_at.elapsed(),
            };
            info!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                cancelled,
                elapsed_ms = summary.elapsed.as_millis() as u64,
                "Batch finished"
            );
            observer.on_finished(&summary);
            summary
        }
        .instrument(run_span)
        .await;
        Ok(summary)
    }

    /// Re-processes the document at `index` and replaces that slot wholesale.
    ///
    /// The store lock is not held while the services are called. The write
    /// resolves the slot against the latest sequence: if the document moved,
    /// it is found again by its original file name.
    #[instrument(skip(self, store))]
    pub async fn retry(&self, index: usize, store: &SessionStore) -> Result<RetryStatus> {
        let target = store
            .read(|s| {
                s.documents.get(index).map(|outcome| {
                    let name = outcome.original_file_name().to_string();
                    let file = s.files.iter().find(|f| f.name() == name).cloned();
                    (name, file)
                })
            })
            .await;
        let (file_name, file) = target.ok_or_else(|| {
            PipelineError::Unexpected(format!("No document at index {} to retry", index))
        })?;
        let Some(file) = file else {
            RETRY_LOOKUP_FAILURES_TOTAL.inc();
            let err = PipelineError::LookupFailed { index, file_name };
            warn!(error = %err, "Retry skipped");
            return Ok(RetryStatus::Skipped);
        };

        RETRIES_ATTEMPTED_TOTAL.inc();
        info!(file = %file_name, "Retrying document");
        let outcome = self.process_outcome(&file).await;
        let status = if outcome.is_failure() {
            RetryStatus::Failed
        } else {
            RetryStatus::Succeeded
        };

        let replaced = store
            .update(|s| {
                let slot = match s.documents.get(index) {
                    Some(current) if current.original_file_name() == file_name => Some(index),
                    _ => s
                        .documents
                        .iter()
                        .position(|o| o.original_file_name() == file_name),
                };
                slot.map(|i| s.documents[i] = outcome).is_some()
            })
            .await;
        if !replaced {
            warn!(file = %file_name, "Document left the session during retry. Result dropped.");
            return Ok(RetryStatus::Skipped);
        }
        if status == RetryStatus::Succeeded {
            RETRIES_SUCCEEDED_TOTAL.inc();
        }
        Ok(status)
    }

    /// Retries every failed slot, one after another, pacing between files.
    /// Returns how many of them now succeed.
    pub async fn retry_failed(&self, store: &SessionStore) -> Result<usize> {
        let failed = store.filtered_view(DocumentFilter::Failed).await;
        if failed.is_empty() {
            return Ok(0);
        }
        info!("Retrying {} failed documents", failed.len());

        let mut recovered = 0;
        for (n, (index, _)) in failed.into_iter().enumerate() {
            if n > 0 {
                self.pacer.pace().await;
            }
            if self.retry(index, store).await? == RetryStatus::Succeeded {
                recovered += 1;
            }
        }
        Ok(recovered)
    }

    /// Value form of [`retry`](Self::retry): returns `documents` with slot
    /// `index` replaced, or unchanged when the slot or its file is missing.
    pub async fn retry_documents(
        &self,
        index: usize,
        documents: &[ProcessingOutcome],
        files: &[InputFile],
    ) -> Vec<ProcessingOutcome> {
        let mut updated = documents.to_vec();
        let Some(target) = documents.get(index) else {
            warn!(index, "No document at index to retry");
            return updated;
        };
        let file_name = target.original_file_name();
        let Some(file) = files.iter().find(|f| f.name() == file_name) else {
            RETRY_LOOKUP_FAILURES_TOTAL.inc();
            let err = PipelineError::LookupFailed {
                index,
                file_name: file_name.to_string(),
            };
            warn!(error = %err, "Retry skipped");
            return updated;
        };

        RETRIES_ATTEMPTED_TOTAL.inc();
        let outcome = self.process_outcome(file).await;
        if !outcome.is_failure() {
            RETRIES_SUCCEEDED_TOTAL.inc();
        }
        updated[index] = outcome;
        updated
    }
}
