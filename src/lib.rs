#![allow(non_snake_case)]

// Declare the modules that form the library's public API
pub mod config;
pub mod data_model;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod session;
pub mod utils;

pub use data_model::{DocumentType, InputFile, ProcessedDocument, ProcessingOutcome};
pub use error::{PipelineError, Result};
pub use executor::{BatchExecutor, BatchObserver, BatchSummary, CancelHandle, RetryStatus};
pub use session::{DocumentFilter, SessionStore};
