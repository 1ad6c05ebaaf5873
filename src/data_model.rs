use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Literal value reported as `orden` for a document that could not be processed.
pub const FAILURE_MARKER: &str = "Fallo de Procesamiento";

/// An uploaded PDF. Bytes are shared, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    name: String,
    bytes: Arc<[u8]>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        InputFile {
            name: name.into(),
            bytes: Arc::from(bytes.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// The four record types handled by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentType {
    WorkOrder,
    SupplyRequest,
    Uninstallation,
    Installation,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::WorkOrder,
        DocumentType::SupplyRequest,
        DocumentType::Uninstallation,
        DocumentType::Installation,
    ];

    /// Tag used on the wire and in serialized documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::WorkOrder => "workOrder",
            DocumentType::SupplyRequest => "supplyRequest",
            DocumentType::Uninstallation => "uninstallation",
            DocumentType::Installation => "installation",
        }
    }

    /// Filesystem-friendly name, used for export tables and archive folders.
    pub fn slug(&self) -> &'static str {
        match self {
            DocumentType::WorkOrder => "work_orders",
            DocumentType::SupplyRequest => "supply_requests",
            DocumentType::Uninstallation => "uninstallations",
            DocumentType::Installation => "installations",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        DocumentType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PipelineError::Unexpected(format!("Unknown document type '{}'", s)))
    }
}

/// Classifier answer. `Unknown` is a valid answer, not a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Recognized(DocumentType),
    Unknown,
}

impl Classification {
    pub fn from_tag(tag: &str) -> Self {
        tag.parse::<DocumentType>()
            .map(Classification::Recognized)
            .unwrap_or(Classification::Unknown)
    }
}

// --- Extracted records: one flat shape per document type, every field defaults to "" ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkOrderFields {
    pub orden: String,
    pub serie: String,
    pub fecha_registro: String,
    pub categoria: String,
    pub descripcion: String,
    pub fecha_cierre: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SupplyRequestFields {
    pub orden: String,
    pub serie: String,
    pub fecha_registro: String,
    #[serde(rename = "contadorBN")]
    pub contador_bn: String,
    pub fecha_entrega: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UninstallationFields {
    pub folio: String,
    pub serie: String,
    pub fecha: String,
    #[serde(rename = "contadorBN")]
    pub contador_bn: String,
    pub contador_color: String,
    pub contador_escaner: String,
    pub comentarios: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstallationFields {
    pub folio: String,
    pub serie: String,
    pub fecha: String,
    #[serde(rename = "contadorBN")]
    pub contador_bn: String,
    pub comentarios: String,
}

/// Raw extractor output, tagged by the type the extractor was asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedRecord {
    WorkOrder(WorkOrderFields),
    SupplyRequest(SupplyRequestFields),
    Uninstallation(UninstallationFields),
    Installation(InstallationFields),
}

impl ExtractedRecord {
    pub fn document_type(&self) -> DocumentType {
        match self {
            ExtractedRecord::WorkOrder(_) => DocumentType::WorkOrder,
            ExtractedRecord::SupplyRequest(_) => DocumentType::SupplyRequest,
            ExtractedRecord::Uninstallation(_) => DocumentType::Uninstallation,
            ExtractedRecord::Installation(_) => DocumentType::Installation,
        }
    }

    /// `orden` for work orders and supply requests, `folio` for (un)installations.
    pub fn identifier(&self) -> &str {
        match self {
            ExtractedRecord::WorkOrder(f) => &f.orden,
            ExtractedRecord::SupplyRequest(f) => &f.orden,
            ExtractedRecord::Uninstallation(f) => &f.folio,
            ExtractedRecord::Installation(f) => &f.folio,
        }
    }
}

// --- Processed documents ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderDocument {
    pub orden: String,
    pub archivo: String,
    pub original_file_name: String,
    pub serie: String,
    pub fecha_registro: String,
    pub categoria: String,
    pub descripcion: String,
    pub fecha_cierre: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyRequestDocument {
    pub orden: String,
    pub archivo: String,
    pub original_file_name: String,
    pub serie: String,
    pub fecha_registro: String,
    pub contador: String,
    pub fecha_entrega: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UninstallationDocument {
    pub orden: String,
    pub archivo: String,
    pub original_file_name: String,
    pub serie: String,
    pub fecha: String,
    #[serde(rename = "contadorBN")]
    pub contador_bn: String,
    pub contador_color: String,
    pub contador_escaner: String,
    pub link: String,
    pub comentarios: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationDocument {
    pub orden: String,
    pub archivo: String,
    pub original_file_name: String,
    pub serie: String,
    pub fecha: String,
    #[serde(rename = "contadorBN")]
    pub contador_bn: String,
    pub link: String,
    pub comentarios: String,
}

/// Canonical result of processing one file successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProcessedDocument {
    WorkOrder(WorkOrderDocument),
    SupplyRequest(SupplyRequestDocument),
    Uninstallation(UninstallationDocument),
    Installation(InstallationDocument),
}

impl ProcessedDocument {
    pub fn document_type(&self) -> DocumentType {
        match self {
            ProcessedDocument::WorkOrder(_) => DocumentType::WorkOrder,
            ProcessedDocument::SupplyRequest(_) => DocumentType::SupplyRequest,
            ProcessedDocument::Uninstallation(_) => DocumentType::Uninstallation,
            ProcessedDocument::Installation(_) => DocumentType::Installation,
        }
    }

    pub fn orden(&self) -> &str {
        match self {
            ProcessedDocument::WorkOrder(d) => &d.orden,
            ProcessedDocument::SupplyRequest(d) => &d.orden,
            ProcessedDocument::Uninstallation(d) => &d.orden,
            ProcessedDocument::Installation(d) => &d.orden,
        }
    }

    pub fn archivo(&self) -> &str {
        match self {
            ProcessedDocument::WorkOrder(d) => &d.archivo,
            ProcessedDocument::SupplyRequest(d) => &d.archivo,
            ProcessedDocument::Uninstallation(d) => &d.archivo,
            ProcessedDocument::Installation(d) => &d.archivo,
        }
    }

    pub fn original_file_name(&self) -> &str {
        match self {
            ProcessedDocument::WorkOrder(d) => &d.original_file_name,
            ProcessedDocument::SupplyRequest(d) => &d.original_file_name,
            ProcessedDocument::Uninstallation(d) => &d.original_file_name,
            ProcessedDocument::Installation(d) => &d.original_file_name,
        }
    }

    /// The date string the result sorter orders by: `fechaRegistro` where the
    /// variant has one, `fecha` otherwise.
    pub fn sort_date(&self) -> &str {
        match self {
            ProcessedDocument::WorkOrder(d) => &d.fecha_registro,
            ProcessedDocument::SupplyRequest(d) => &d.fecha_registro,
            ProcessedDocument::Uninstallation(d) => &d.fecha,
            ProcessedDocument::Installation(d) => &d.fecha,
        }
    }

    /// Overwrites one editable string field, addressed by its serialized name.
    ///
    /// `type` and `originalFileName` are not editable: the first is the variant
    /// itself and the second is the back-reference used by retry and export.
    pub fn set_field(&mut self, field: &str, value: impl Into<String>) -> Result<()> {
        let doc_type = self.document_type();
        let slot: Option<&mut String> = match self {
            ProcessedDocument::WorkOrder(d) => match field {
                "orden" => Some(&mut d.orden),
                "archivo" => Some(&mut d.archivo),
                "serie" => Some(&mut d.serie),
                "fechaRegistro" => Some(&mut d.fecha_registro),
                "categoria" => Some(&mut d.categoria),
                "descripcion" => Some(&mut d.descripcion),
                "fechaCierre" => Some(&mut d.fecha_cierre),
                _ => None,
            },
            ProcessedDocument::SupplyRequest(d) => match field {
                "orden" => Some(&mut d.orden),
                "archivo" => Some(&mut d.archivo),
                "serie" => Some(&mut d.serie),
                "fechaRegistro" => Some(&mut d.fecha_registro),
                "contador" => Some(&mut d.contador),
                "fechaEntrega" => Some(&mut d.fecha_entrega),
                _ => None,
            },
            ProcessedDocument::Uninstallation(d) => match field {
                "orden" => Some(&mut d.orden),
                "archivo" => Some(&mut d.archivo),
                "serie" => Some(&mut d.serie),
                "fecha" => Some(&mut d.fecha),
                "contadorBN" => Some(&mut d.contador_bn),
                "contadorColor" => Some(&mut d.contador_color),
                "contadorEscaner" => Some(&mut d.contador_escaner),
                "link" => Some(&mut d.link),
                "comentarios" => Some(&mut d.comentarios),
                _ => None,
            },
            ProcessedDocument::Installation(d) => match field {
                "orden" => Some(&mut d.orden),
                "archivo" => Some(&mut d.archivo),
                "serie" => Some(&mut d.serie),
                "fecha" => Some(&mut d.fecha),
                "contadorBN" => Some(&mut d.contador_bn),
                "link" => Some(&mut d.link),
                "comentarios" => Some(&mut d.comentarios),
                _ => None,
            },
        };

        match slot {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(PipelineError::Unexpected(format!(
                "Field '{}' is not editable on a {} document",
                field, doc_type
            ))),
        }
    }
}

/// One slot of the result sequence: either a processed document or a failure
/// carrying the file it came from and why it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ProcessingOutcome {
    Success {
        document: ProcessedDocument,
    },
    #[serde(rename_all = "camelCase")]
    Failed {
        original_file_name: String,
        error: String,
    },
}

impl ProcessingOutcome {
    pub fn failed(original_file_name: impl Into<String>, error: impl Into<String>) -> Self {
        ProcessingOutcome::Failed {
            original_file_name: original_file_name.into(),
            error: error.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ProcessingOutcome::Failed { .. })
    }

    pub fn document(&self) -> Option<&ProcessedDocument> {
        match self {
            ProcessingOutcome::Success { document } => Some(document),
            ProcessingOutcome::Failed { .. } => None,
        }
    }

    pub fn document_mut(&mut self) -> Option<&mut ProcessedDocument> {
        match self {
            ProcessingOutcome::Success { document } => Some(document),
            ProcessingOutcome::Failed { .. } => None,
        }
    }

    pub fn original_file_name(&self) -> &str {
        match self {
            ProcessingOutcome::Success { document } => document.original_file_name(),
            ProcessingOutcome::Failed {
                original_file_name, ..
            } => original_file_name,
        }
    }

    /// Document number as displayed; failures report [`FAILURE_MARKER`].
    pub fn orden(&self) -> &str {
        match self {
            ProcessingOutcome::Success { document } => document.orden(),
            ProcessingOutcome::Failed { .. } => FAILURE_MARKER,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ProcessingOutcome::Success { .. } => None,
            ProcessingOutcome::Failed { error, .. } => Some(error),
        }
    }

    /// Failed slots are listed under the work-order type, as the sentinel record was.
    pub fn document_type(&self) -> DocumentType {
        match self {
            ProcessingOutcome::Success { document } => document.document_type(),
            ProcessingOutcome::Failed { .. } => DocumentType::WorkOrder,
        }
    }
}

impl From<ProcessedDocument> for ProcessingOutcome {
    fn from(document: ProcessedDocument) -> Self {
        ProcessingOutcome::Success { document }
    }
}
