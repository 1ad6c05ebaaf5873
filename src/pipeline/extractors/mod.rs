// src/pipeline/extractors/mod.rs

mod prompts;
mod service_extractor;

use std::sync::Arc;

use async_trait::async_trait;

use crate::data_model::{DocumentType, ExtractedRecord, InputFile};
use crate::error::{PipelineError, Result};
use crate::pipeline::vision::VisionClient;

pub use service_extractor::{record_from_json, ServiceExtractor};

/// Pulls the type-specific fields out of one scanned file.
///
/// Absent fields come back as empty strings. A response that cannot be read
/// as a record at all is an error.
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    fn document_type(&self) -> DocumentType;

    async fn extract(&self, file: &InputFile) -> Result<ExtractedRecord>;
}

/// Exactly one extractor per document type.
pub struct ExtractorSet {
    work_order: Box<dyn FieldExtractor>,
    supply_request: Box<dyn FieldExtractor>,
    uninstallation: Box<dyn FieldExtractor>,
    installation: Box<dyn FieldExtractor>,
}

impl ExtractorSet {
    pub fn new(
        work_order: Box<dyn FieldExtractor>,
        supply_request: Box<dyn FieldExtractor>,
        uninstallation: Box<dyn FieldExtractor>,
        installation: Box<dyn FieldExtractor>,
    ) -> Result<Self> {
        let slots = [
            (DocumentType::WorkOrder, &work_order),
            (DocumentType::SupplyRequest, &supply_request),
            (DocumentType::Uninstallation, &uninstallation),
            (DocumentType::Installation, &installation),
        ];
        for (expected, extractor) in slots {
            if extractor.document_type() != expected {
                return Err(PipelineError::ConfigError(format!(
                    "Extractor for {} registered in the {} slot",
                    extractor.document_type(),
                    expected
                )));
            }
        }
        Ok(ExtractorSet {
            work_order,
            supply_request,
            uninstallation,
            installation,
        })
    }

    /// One [`ServiceExtractor`] per type, all sharing the same client.
    pub fn service_backed(client: Arc<dyn VisionClient>) -> Self {
        ExtractorSet {
            work_order: Box::new(ServiceExtractor::new(DocumentType::WorkOrder, client.clone())),
            supply_request: Box::new(ServiceExtractor::new(
                DocumentType::SupplyRequest,
                client.clone(),
            )),
            uninstallation: Box::new(ServiceExtractor::new(
                DocumentType::Uninstallation,
                client.clone(),
            )),
            installation: Box::new(ServiceExtractor::new(DocumentType::Installation, client)),
        }
    }

    pub fn get(&self, document_type: DocumentType) -> &dyn FieldExtractor {
        match document_type {
            DocumentType::WorkOrder => self.work_order.as_ref(),
            DocumentType::SupplyRequest => self.supply_request.as_ref(),
            DocumentType::Uninstallation => self.uninstallation.as_ref(),
            DocumentType::Installation => self.installation.as_ref(),
        }
    }
}
