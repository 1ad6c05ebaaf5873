//! Typed export tables: successful documents split by type, each with a fixed
//! column order. Failed outcomes never reach a table.

use crate::data_model::{
    DocumentType, InstallationDocument, ProcessedDocument, ProcessingOutcome,
    SupplyRequestDocument, UninstallationDocument, WorkOrderDocument,
};

pub const WORK_ORDER_COLUMNS: &[&str] = &[
    "orden",
    "serie",
    "fechaRegistro",
    "categoria",
    "descripcion",
    "fechaCierre",
    "archivo",
];

pub const SUPPLY_REQUEST_COLUMNS: &[&str] = &[
    "orden",
    "serie",
    "fechaRegistro",
    "contador",
    "fechaEntrega",
    "archivo",
];

pub const UNINSTALLATION_COLUMNS: &[&str] = &[
    "orden",
    "serie",
    "fecha",
    "contadorBN",
    "contadorColor",
    "contadorEscaner",
    "comentarios",
    "link",
];

pub const INSTALLATION_COLUMNS: &[&str] = &[
    "orden",
    "serie",
    "fecha",
    "contadorBN",
    "comentarios",
    "link",
];

pub fn columns(document_type: DocumentType) -> &'static [&'static str] {
    match document_type {
        DocumentType::WorkOrder => WORK_ORDER_COLUMNS,
        DocumentType::SupplyRequest => SUPPLY_REQUEST_COLUMNS,
        DocumentType::Uninstallation => UNINSTALLATION_COLUMNS,
        DocumentType::Installation => INSTALLATION_COLUMNS,
    }
}

/// The four per-type sequences handed to exporters, in result order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTables {
    pub work_orders: Vec<WorkOrderDocument>,
    pub supply_requests: Vec<SupplyRequestDocument>,
    pub uninstallations: Vec<UninstallationDocument>,
    pub installations: Vec<InstallationDocument>,
}

impl ExportTables {
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a ProcessingOutcome>) -> Self {
        let mut tables = ExportTables::default();
        for document in outcomes.into_iter().filter_map(ProcessingOutcome::document) {
            match document {
                ProcessedDocument::WorkOrder(d) => tables.work_orders.push(d.clone()),
                ProcessedDocument::SupplyRequest(d) => tables.supply_requests.push(d.clone()),
                ProcessedDocument::Uninstallation(d) => tables.uninstallations.push(d.clone()),
                ProcessedDocument::Installation(d) => tables.installations.push(d.clone()),
            }
        }
        tables
    }

    pub fn len(&self, document_type: DocumentType) -> usize {
        match document_type {
            DocumentType::WorkOrder => self.work_orders.len(),
            DocumentType::SupplyRequest => self.supply_requests.len(),
            DocumentType::Uninstallation => self.uninstallations.len(),
            DocumentType::Installation => self.installations.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        DocumentType::ALL.iter().all(|t| self.len(*t) == 0)
    }

    /// Cell values of one table, row by row, in [`columns`] order.
    pub fn rows(&self, document_type: DocumentType) -> Vec<Vec<String>> {
        match document_type {
            DocumentType::WorkOrder => self
                .work_orders
                .iter()
                .map(|d| {
                    vec![
                        d.orden.clone(),
                        d.serie.clone(),
                        d.fecha_registro.clone(),
                        d.categoria.clone(),
                        d.descripcion.clone(),
                        d.fecha_cierre.clone(),
                        d.archivo.clone(),
                    ]
                })
                .collect(),
            DocumentType::SupplyRequest => self
                .supply_requests
                .iter()
                .map(|d| {
                    vec![
                        d.orden.clone(),
                        d.serie.clone(),
                        d.fecha_registro.clone(),
                        d.contador.clone(),
                        d.fecha_entrega.clone(),
                        d.archivo.clone(),
                    ]
                })
                .collect(),
            DocumentType::Uninstallation => self
                .uninstallations
                .iter()
                .map(|d| {
                    vec![
                        d.orden.clone(),
                        d.serie.clone(),
                        d.fecha.clone(),
                        d.contador_bn.clone(),
                        d.contador_color.clone(),
                        d.contador_escaner.clone(),
                        d.comentarios.clone(),
                        d.link.clone(),
                    ]
                })
                .collect(),
            DocumentType::Installation => self
                .installations
                .iter()
                .map(|d| {
                    vec![
                        d.orden.clone(),
                        d.serie.clone(),
                        d.fecha.clone(),
                        d.contador_bn.clone(),
                        d.comentarios.clone(),
                        d.link.clone(),
                    ]
                })
                .collect(),
        }
    }
}
