#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use FolioScan::data_model::{
    Classification, DocumentType, ExtractedRecord, InputFile, InstallationFields,
    SupplyRequestFields, UninstallationFields, WorkOrderFields,
};
use FolioScan::error::{PipelineError, Result};
use FolioScan::executor::BatchExecutor;
use FolioScan::pipeline::classifier::DocumentClassifier;
use FolioScan::pipeline::extractors::{ExtractorSet, FieldExtractor};
use FolioScan::pipeline::pacing::{NoPacing, Pacer};

/// What the mock services answer for one file name.
#[derive(Clone)]
pub struct Scripted {
    pub classification: std::result::Result<Classification, String>,
    pub extraction: std::result::Result<ExtractedRecord, String>,
    pub delay: Option<Duration>,
}

impl Scripted {
    pub fn ok(record: ExtractedRecord) -> Self {
        Scripted {
            classification: Ok(Classification::Recognized(record.document_type())),
            extraction: Ok(record),
            delay: None,
        }
    }

    pub fn extraction_error(document_type: DocumentType, message: &str) -> Self {
        Scripted {
            classification: Ok(Classification::Recognized(document_type)),
            extraction: Err(message.to_string()),
            delay: None,
        }
    }

    pub fn unknown() -> Self {
        Scripted {
            classification: Ok(Classification::Unknown),
            extraction: Err("never extracted".to_string()),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Answers shared by the mock classifier and extractors; tests may rewrite an
/// entry between runs. Every service call is logged by file name.
#[derive(Default)]
pub struct Script {
    entries: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<String>>,
}

impl Script {
    pub fn set(&self, file_name: &str, scripted: Scripted) {
        self.entries
            .lock()
            .unwrap()
            .insert(file_name.to_string(), scripted);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn lookup(&self, call: &str, file: &InputFile) -> Result<Scripted> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{}", call, file.name()));
        self.entries
            .lock()
            .unwrap()
            .get(file.name())
            .cloned()
            .ok_or_else(|| PipelineError::ServiceError(format!("no script for {}", file.name())))
    }
}

pub struct ScriptedClassifier(pub Arc<Script>);

#[async_trait]
impl DocumentClassifier for ScriptedClassifier {
    fn name(&self) -> &'static str {
        "ScriptedClassifier"
    }

    async fn classify(&self, file: &InputFile) -> Result<Classification> {
        let scripted = self.0.lookup("classify", file)?;
        scripted.classification.map_err(PipelineError::ServiceError)
    }
}

pub struct ScriptedExtractor {
    document_type: DocumentType,
    script: Arc<Script>,
}

#[async_trait]
impl FieldExtractor for ScriptedExtractor {
    fn document_type(&self) -> DocumentType {
        self.document_type
    }

    async fn extract(&self, file: &InputFile) -> Result<ExtractedRecord> {
        let scripted = self.script.lookup("extract", file)?;
        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }
        scripted
            .extraction
            .map_err(|message| PipelineError::ExtractionFailed {
                document_type: self.document_type,
                message,
            })
    }
}

pub fn scripted_extractors(script: &Arc<Script>) -> ExtractorSet {
    let make = |document_type| -> Box<dyn FieldExtractor> {
        Box::new(ScriptedExtractor {
            document_type,
            script: script.clone(),
        })
    };
    ExtractorSet::new(
        make(DocumentType::WorkOrder),
        make(DocumentType::SupplyRequest),
        make(DocumentType::Uninstallation),
        make(DocumentType::Installation),
    )
    .expect("one extractor per slot")
}

pub fn executor_with_pacer(script: &Arc<Script>, pacer: Arc<dyn Pacer>) -> BatchExecutor {
    BatchExecutor::new(
        Arc::new(ScriptedClassifier(script.clone())),
        Arc::new(scripted_extractors(script)),
        pacer,
    )
}

pub fn executor(script: &Arc<Script>) -> BatchExecutor {
    executor_with_pacer(script, Arc::new(NoPacing))
}

/// Counts how often the batch loop paced.
#[derive(Default)]
pub struct CountingPacer(pub AtomicUsize);

#[async_trait]
impl Pacer for CountingPacer {
    fn name(&self) -> &'static str {
        "CountingPacer"
    }

    async fn pace(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn pdf(name: &str) -> InputFile {
    InputFile::new(name, format!("%PDF-1.4 {}", name).into_bytes())
}

pub fn work_order(orden: &str, fecha_registro: &str) -> ExtractedRecord {
    ExtractedRecord::WorkOrder(WorkOrderFields {
        orden: orden.to_string(),
        serie: "SN-100".to_string(),
        fecha_registro: fecha_registro.to_string(),
        categoria: "Correctivo".to_string(),
        descripcion: "Atasco de papel".to_string(),
        fecha_cierre: String::new(),
    })
}

pub fn supply_request(orden: &str, fecha_registro: &str) -> ExtractedRecord {
    ExtractedRecord::SupplyRequest(SupplyRequestFields {
        orden: orden.to_string(),
        serie: "SN-200".to_string(),
        fecha_registro: fecha_registro.to_string(),
        contador_bn: "15432".to_string(),
        fecha_entrega: String::new(),
    })
}

pub fn uninstallation(folio: &str, fecha: &str) -> ExtractedRecord {
    ExtractedRecord::Uninstallation(UninstallationFields {
        folio: folio.to_string(),
        serie: "SN-300".to_string(),
        fecha: fecha.to_string(),
        contador_bn: "9000".to_string(),
        contador_color: "1200".to_string(),
        contador_escaner: "300".to_string(),
        comentarios: String::new(),
    })
}

pub fn installation(folio: &str, fecha: &str) -> ExtractedRecord {
    ExtractedRecord::Installation(InstallationFields {
        folio: folio.to_string(),
        serie: "SN-400".to_string(),
        fecha: fecha.to_string(),
        contador_bn: "0".to_string(),
        comentarios: "Equipo nuevo".to_string(),
    })
}
