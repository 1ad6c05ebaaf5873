use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use super::prompts::extraction_prompt;
use super::FieldExtractor;
use crate::data_model::{
    DocumentType, ExtractedRecord, InputFile, InstallationFields, SupplyRequestFields,
    UninstallationFields, WorkOrderFields,
};
use crate::error::{PipelineError, Result};
use crate::pipeline::vision::{parse_json_object, VisionClient};

/// Extractor that prompts the vision model with the schema of one document type.
pub struct ServiceExtractor {
    document_type: DocumentType,
    client: Arc<dyn VisionClient>,
}

impl ServiceExtractor {
    pub fn new(document_type: DocumentType, client: Arc<dyn VisionClient>) -> Self {
        ServiceExtractor {
            document_type,
            client,
        }
    }
}

#[async_trait]
impl FieldExtractor for ServiceExtractor {
    fn document_type(&self) -> DocumentType {
        self.document_type
    }

    async fn extract(&self, file: &InputFile) -> Result<ExtractedRecord> {
        let answer = self
            .client
            .generate(extraction_prompt(self.document_type), file.bytes())
            .await?;
        let object = parse_json_object(&answer).map_err(|message| {
            PipelineError::ExtractionFailed {
                document_type: self.document_type,
                message,
            }
        })?;
        debug!(file = %file.name(), fields = object.len(), "Extracted fields");
        Ok(record_from_json(self.document_type, &object))
    }
}

/// String value of `key`. Numbers and booleans are rendered, anything else is "".
fn field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Builds the record for `document_type` from a JSON object, defaulting every
/// missing field to an empty string.
pub fn record_from_json(document_type: DocumentType, object: &Map<String, Value>) -> ExtractedRecord {
    match document_type {
        DocumentType::WorkOrder => ExtractedRecord::WorkOrder(WorkOrderFields {
            orden: field(object, "orden"),
            serie: field(object, "serie"),
            fecha_registro: field(object, "fechaRegistro"),
            categoria: field(object, "categoria"),
            descripcion: field(object, "descripcion"),
            fecha_cierre: field(object, "fechaCierre"),
        }),
        DocumentType::SupplyRequest => ExtractedRecord::SupplyRequest(SupplyRequestFields {
            orden: field(object, "orden"),
            serie: field(object, "serie"),
            fecha_registro: field(object, "fechaRegistro"),
            contador_bn: field(object, "contadorBN"),
            fecha_entrega: field(object, "fechaEntrega"),
        }),
        DocumentType::Uninstallation => ExtractedRecord::Uninstallation(UninstallationFields {
            folio: field(object, "folio"),
            serie: field(object, "serie"),
            fecha: field(object, "fecha"),
            contador_bn: field(object, "contadorBN"),
            contador_color: field(object, "contadorColor"),
            contador_escaner: field(object, "contadorEscaner"),
            comentarios: field(object, "comentarios"),
        }),
        DocumentType::Installation => ExtractedRecord::Installation(InstallationFields {
            folio: field(object, "folio"),
            serie: field(object, "serie"),
            fecha: field(object, "fecha"),
            contador_bn: field(object, "contadorBN"),
            comentarios: field(object, "comentarios"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Answer(&'static str);

    #[async_trait]
    impl VisionClient for Answer {
        async fn generate(&self, _prompt: &str, _pdf: &[u8]) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let record = record_from_json(DocumentType::WorkOrder, &object(json!({"orden": "1001"})));
        assert_eq!(
            record,
            ExtractedRecord::WorkOrder(WorkOrderFields {
                orden: "1001".to_string(),
                ..Default::default()
            })
        );
    }

    #[test]
    fn numbers_are_kept_as_text() {
        let record = record_from_json(
            DocumentType::Uninstallation,
            &object(json!({"folio": 553, "contadorBN": 10234, "comentarios": null})),
        );
        match record {
            ExtractedRecord::Uninstallation(f) => {
                assert_eq!(f.folio, "553");
                assert_eq!(f.contador_bn, "10234");
                assert_eq!(f.comentarios, "");
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_answer_is_an_extraction_failure() {
        let extractor =
            ServiceExtractor::new(DocumentType::SupplyRequest, Arc::new(Answer("no es json")));
        let file = InputFile::new("s.pdf", b"%PDF".to_vec());
        match extractor.extract(&file).await {
            Err(PipelineError::ExtractionFailed { document_type, .. }) => {
                assert_eq!(document_type, DocumentType::SupplyRequest)
            }
            other => panic!("expected ExtractionFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fenced_answer_is_accepted() {
        let extractor = ServiceExtractor::new(
            DocumentType::Installation,
            Arc::new(Answer("```json\n{\"folio\": \"I-9\", \"fecha\": \"05-03-24\"}\n```")),
        );
        let file = InputFile::new("i.pdf", b"%PDF".to_vec());
        let record = extractor.extract(&file).await.unwrap();
        assert_eq!(record.identifier(), "I-9");
        assert_eq!(record.document_type(), DocumentType::Installation);
    }
}
