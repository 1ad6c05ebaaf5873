use crate::data_model::{
    ExtractedRecord, InstallationDocument, ProcessedDocument, SupplyRequestDocument,
    UninstallationDocument, WorkOrderDocument,
};

/// Export filename for a document: `{identifier}.pdf`, or the uploaded name
/// when the identifier was not extracted.
pub fn derive_archivo(identifier: &str, original_file_name: &str) -> String {
    if identifier.is_empty() {
        original_file_name.to_string()
    } else {
        format!("{}.pdf", identifier)
    }
}

/// Maps an extractor record onto the canonical document for its type.
///
/// Pure and infallible: missing fields are already empty strings. `folio`
/// becomes `orden` for (un)installations, and their `link` always equals
/// `archivo`.
pub fn normalize(record: ExtractedRecord, original_file_name: &str) -> ProcessedDocument {
    let archivo = derive_archivo(record.identifier(), original_file_name);
    let original_file_name = original_file_name.to_string();

    match record {
        ExtractedRecord::WorkOrder(f) => ProcessedDocument::WorkOrder(WorkOrderDocument {
            orden: f.orden,
            archivo,
            original_file_name,
            serie: f.serie,
            fecha_registro: f.fecha_registro,
            categoria: f.categoria,
            descripcion: f.descripcion,
            fecha_cierre: f.fecha_cierre,
        }),
        ExtractedRecord::SupplyRequest(f) => {
            ProcessedDocument::SupplyRequest(SupplyRequestDocument {
                orden: f.orden,
                archivo,
                original_file_name,
                serie: f.serie,
                fecha_registro: f.fecha_registro,
                contador: f.contador_bn,
                fecha_entrega: f.fecha_entrega,
            })
        }
        ExtractedRecord::Uninstallation(f) => {
            ProcessedDocument::Uninstallation(UninstallationDocument {
                orden: f.folio,
                link: archivo.clone(),
                archivo,
                original_file_name,
                serie: f.serie,
                fecha: f.fecha,
                contador_bn: f.contador_bn,
                contador_color: f.contador_color,
                contador_escaner: f.contador_escaner,
                comentarios: f.comentarios,
            })
        }
        ExtractedRecord::Installation(f) => ProcessedDocument::Installation(InstallationDocument {
            orden: f.folio,
            link: archivo.clone(),
            archivo,
            original_file_name,
            serie: f.serie,
            fecha: f.fecha,
            contador_bn: f.contador_bn,
            comentarios: f.comentarios,
        }),
    }
}
