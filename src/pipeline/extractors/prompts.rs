use crate::data_model::DocumentType;

const WORK_ORDER_PROMPT: &str = "\
Extrae los datos de esta orden de trabajo de servicio técnico. Responde solo con un objeto JSON \
con las claves: \"orden\" (número de orden), \"serie\" (número de serie del equipo), \
\"fechaRegistro\" (fecha de registro, formato DD-MM-YY), \"categoria\", \"descripcion\" \
(descripción de la falla o del servicio) y \"fechaCierre\" (fecha de cierre, formato DD-MM-YY). \
Usa \"\" para cualquier dato que no aparezca.";

const SUPPLY_REQUEST_PROMPT: &str = "\
Extrae los datos de esta solicitud de suministros. Responde solo con un objeto JSON con las \
claves: \"orden\" (número de orden), \"serie\" (número de serie del equipo), \"fechaRegistro\" \
(formato MM/DD/YY), \"contadorBN\" (lectura del contador blanco y negro) y \"fechaEntrega\" \
(formato MM/DD/YY). Usa \"\" para cualquier dato que no aparezca.";

const UNINSTALLATION_PROMPT: &str = "\
Extrae los datos de esta acta de desinstalación de equipo. Responde solo con un objeto JSON con \
las claves: \"folio\", \"serie\", \"fecha\" (formato DD-MM-YY), \"contadorBN\", \
\"contadorColor\", \"contadorEscaner\" y \"comentarios\". Usa \"\" para cualquier dato que no \
aparezca.";

const INSTALLATION_PROMPT: &str = "\
Extrae los datos de esta acta de instalación de equipo. Responde solo con un objeto JSON con las \
claves: \"folio\", \"serie\", \"fecha\" (formato DD-MM-YY), \"contadorBN\" y \"comentarios\". \
Usa \"\" para cualquier dato que no aparezca.";

pub fn extraction_prompt(document_type: DocumentType) -> &'static str {
    match document_type {
        DocumentType::WorkOrder => WORK_ORDER_PROMPT,
        DocumentType::SupplyRequest => SUPPLY_REQUEST_PROMPT,
        DocumentType::Uninstallation => UNINSTALLATION_PROMPT,
        DocumentType::Installation => INSTALLATION_PROMPT,
    }
}
