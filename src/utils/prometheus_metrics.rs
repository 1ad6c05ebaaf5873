// src/utils/prometheus_metrics.rs

use once_cell::sync::Lazy;
use prometheus::{register_counter, register_gauge, register_histogram, Counter, Gauge, Histogram};

// Batch pipeline
pub static DOCUMENTS_PROCESSED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "folioscan_documents_processed_total",
        "Total number of files run through classification and extraction."
    )
    .expect("Failed to register DOCUMENTS_PROCESSED_TOTAL counter")
});

pub static DOCUMENTS_SUCCEEDED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "folioscan_documents_succeeded_total",
        "Total number of files that produced a processed document."
    )
    .expect("Failed to register DOCUMENTS_SUCCEEDED_TOTAL counter")
});

pub static DOCUMENTS_FAILED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "folioscan_documents_failed_total",
        "Total number of files recorded as failed."
    )
    .expect("Failed to register DOCUMENTS_FAILED_TOTAL counter")
});

pub static DOCUMENT_PROCESSING_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "folioscan_document_processing_duration_seconds",
        "Histogram of per-file classification + extraction durations."
    )
    .expect("Failed to register DOCUMENT_PROCESSING_DURATION_SECONDS histogram")
});

pub static ACTIVE_DOCUMENTS_IN_FLIGHT: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "folioscan_documents_in_flight",
        "Number of files currently being classified or extracted."
    )
    .expect("Failed to register ACTIVE_DOCUMENTS_IN_FLIGHT gauge")
});

// Retries
pub static RETRIES_ATTEMPTED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "folioscan_retries_attempted_total",
        "Total number of single-document retries started."
    )
    .expect("Failed to register RETRIES_ATTEMPTED_TOTAL counter")
});

pub static RETRIES_SUCCEEDED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "folioscan_retries_succeeded_total",
        "Total number of retries that produced a processed document."
    )
    .expect("Failed to register RETRIES_SUCCEEDED_TOTAL counter")
});

pub static RETRY_LOOKUP_FAILURES_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "folioscan_retry_lookup_failures_total",
        "Total number of retries skipped because no input file matched."
    )
    .expect("Failed to register RETRY_LOOKUP_FAILURES_TOTAL counter")
});

// Export
pub static ARCHIVE_ERRORS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "folioscan_archive_errors_total",
        "Total number of failed archive generations."
    )
    .expect("Failed to register ARCHIVE_ERRORS_TOTAL counter")
});
