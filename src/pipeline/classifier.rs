use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::data_model::{Classification, InputFile};
use crate::error::Result;
use crate::pipeline::vision::{strip_code_fence, VisionClient};

/// Decides which kind of record a scanned file is.
///
/// Transport failures are returned as errors; an answer that names no known
/// type is `Ok(Classification::Unknown)`. The batch executor treats both as a
/// per-file failure.
#[async_trait]
pub trait DocumentClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn classify(&self, file: &InputFile) -> Result<Classification>;
}

const CLASSIFY_PROMPT: &str = "\
Eres un clasificador de documentos escaneados de servicio de impresoras. \
Responde exclusivamente con un objeto JSON de la forma {\"tipo\": \"<valor>\"} donde <valor> es:\n\
- \"workOrder\" si es una orden de trabajo de servicio técnico,\n\
- \"supplyRequest\" si es una solicitud o entrega de suministros (tóner, consumibles),\n\
- \"uninstallation\" si es un acta de desinstalación o retiro de equipo,\n\
- \"installation\" si es un acta de instalación de equipo,\n\
- \"unknown\" si no corresponde a ninguno de los anteriores.";

/// Classifier that asks the vision model for the document type.
pub struct ServiceClassifier {
    client: Arc<dyn VisionClient>,
}

impl ServiceClassifier {
    pub fn new(client: Arc<dyn VisionClient>) -> Self {
        ServiceClassifier { client }
    }
}

#[async_trait]
impl DocumentClassifier for ServiceClassifier {
    fn name(&self) -> &'static str {
        "ServiceClassifier"
    }

    async fn classify(&self, file: &InputFile) -> Result<Classification> {
        let answer = self.client.generate(CLASSIFY_PROMPT, file.bytes()).await?;
        let classification = parse_classification(&answer);
        if classification == Classification::Unknown {
            warn!(file = %file.name(), answer = %answer.trim(), "Classifier did not recognise document");
        } else {
            debug!(file = %file.name(), ?classification, "Classified document");
        }
        Ok(classification)
    }
}

/// Accepts `{"tipo": "..."}`, `{"type": "..."}`, a JSON string or a bare tag.
pub fn parse_classification(answer: &str) -> Classification {
    let body = strip_code_fence(answer);
    let tag = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map
            .get("tipo")
            .or_else(|| map.get("type"))
            .and_then(Value::as_str)
            .map(str::to_string),
        Ok(Value::String(s)) => Some(s),
        Ok(_) => None,
        Err(_) => Some(body.trim_matches('"').to_string()),
    };
    tag.map(|t| Classification::from_tag(&t))
        .unwrap_or(Classification::Unknown)
}
