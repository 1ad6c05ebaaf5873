use crate::data_model::DocumentType;
use thiserror::Error;

/// Custom Result type for this crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The Error type for pipeline operations.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Configuration validation error: {0}")]
    ConfigValidationError(String),

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Parquet writing error: {source}")]
    ParquetError {
        #[from]
        source: parquet::errors::ParquetError,
    },

    #[error("Arrow conversion error: {source}")]
    ArrowError {
        #[from]
        source: arrow::error::ArrowError,
    },

    #[error("Serialization/Deserialization error: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    /// Transport or protocol failure talking to the classification/extraction service.
    #[error("Service error: {0}")]
    ServiceError(String),

    /// The classifier could not place the document in any known type.
    #[error("document type not recognized")]
    ClassificationFailed,

    #[error("Extraction failed for {document_type}: {message}")]
    ExtractionFailed {
        document_type: DocumentType,
        message: String,
    },

    #[error("Error in processing step '{step_name}': {source}")]
    StepError {
        step_name: String,
        source: Box<PipelineError>,
    },

    /// No input file matches the document selected for retry.
    #[error("No input file named '{file_name}' for document at index {index}")]
    LookupFailed { index: usize, file_name: String },

    #[error("Archive generation failed for {document_type}: {message}")]
    ArchiveError {
        document_type: DocumentType,
        message: String,
    },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl PipelineError {
    /// Message recorded on a failed document. Step wrappers are peeled off so the
    /// stored error reads like the underlying cause.
    pub fn document_message(&self) -> String {
        match self {
            PipelineError::StepError { source, .. } => source.document_message(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        PipelineError::ServiceError(err.to_string())
    }
}
