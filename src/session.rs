//! The canonical in-memory session: input files, the current result sequence
//! and batch progress, behind a single lock.
//!
//! Every write goes through [`SessionStore::update`], which runs a closure
//! against the latest state under the write lock. Callers never write back a
//! copy they read earlier.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::data_model::{DocumentType, InputFile, ProcessingOutcome};
use crate::error::{PipelineError, Result};

/// Position of a running batch. `started_at` is fixed when the batch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// 1-based index of the file being processed.
    pub current: usize,
    pub total: usize,
    pub started_at: Instant,
}

impl BatchProgress {
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

#[derive(Debug, Default)]
pub struct SessionState {
    pub files: Vec<InputFile>,
    pub documents: Vec<ProcessingOutcome>,
    /// `None` while idle.
    pub progress: Option<BatchProgress>,
}

/// Read-only copy handed to observers.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub documents: Vec<ProcessingOutcome>,
    pub progress: Option<BatchProgress>,
}

/// Derived views over the result sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFilter {
    All,
    Failed,
    Succeeded,
    OfType(DocumentType),
}

impl DocumentFilter {
    pub fn matches(&self, outcome: &ProcessingOutcome) -> bool {
        match self {
            DocumentFilter::All => true,
            DocumentFilter::Failed => outcome.is_failure(),
            DocumentFilter::Succeeded => !outcome.is_failure(),
            DocumentFilter::OfType(t) => outcome
                .document()
                .is_some_and(|doc| doc.document_type() == *t),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<SessionState>>,
}

impl SessionStore {
    pub fn new(files: Vec<InputFile>) -> Self {
        SessionStore {
            inner: Arc::new(RwLock::new(SessionState {
                files,
                ..Default::default()
            })),
        }
    }

    /// Atomic read-modify-write against the current state.
    pub async fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SessionState) -> R,
    {
        let mut state = self.inner.write().await;
        f(&mut state)
    }

    /// Runs `f` against the current state under the read lock.
    pub async fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SessionState) -> R,
    {
        let state = self.inner.read().await;
        f(&state)
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.read(|s| SessionSnapshot {
            documents: s.documents.clone(),
            progress: s.progress,
        })
        .await
    }

    pub async fn documents(&self) -> Vec<ProcessingOutcome> {
        self.read(|s| s.documents.clone()).await
    }

    pub async fn files(&self) -> Vec<InputFile> {
        self.read(|s| s.files.clone()).await
    }

    pub async fn progress(&self) -> Option<BatchProgress> {
        self.read(|s| s.progress).await
    }

    /// Replaces the input files and clears previous results. Rejected while a
    /// batch is running, since its outcomes belong to the current files.
    pub async fn load_files(&self, files: Vec<InputFile>) -> Result<()> {
        self.update(|s| {
            if s.progress.is_some() {
                return Err(PipelineError::Unexpected(
                    "Cannot replace input files while a batch is running".to_string(),
                ));
            }
            s.files = files;
            s.documents.clear();
            Ok(())
        })
        .await
    }

    /// Canonical indices and copies of the outcomes matching `filter`, taken
    /// from the current sequence.
    pub async fn filtered_view(&self, filter: DocumentFilter) -> Vec<(usize, ProcessingOutcome)> {
        self.read(|s| {
            s.documents
                .iter()
                .enumerate()
                .filter(|(_, outcome)| filter.matches(outcome))
                .map(|(i, outcome)| (i, outcome.clone()))
                .collect()
        })
        .await
    }

    /// Edits one string field of the successful document at `index`.
    pub async fn edit_field(&self, index: usize, field: &str, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        self.update(|s| {
            let outcome = s.documents.get_mut(index).ok_or_else(|| {
                PipelineError::Unexpected(format!("No document at index {}", index))
            })?;
            let document = outcome.document_mut().ok_or_else(|| {
                PipelineError::Unexpected(format!(
                    "Document at index {} failed processing and has no editable fields",
                    index
                ))
            })?;
            document.set_field(field, value)
        })
        .await
    }

    /// (successes, failures) in the current sequence.
    pub async fn counts(&self) -> (usize, usize) {
        self.read(|s| {
            let failed = s.documents.iter().filter(|o| o.is_failure()).count();
            (s.documents.len() - failed, failed)
        })
        .await
    }
}
