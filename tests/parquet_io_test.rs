mod common;

use std::fs::File;

use common::*;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::RowAccessor;
use tempfile::tempdir;
use FolioScan::data_model::{DocumentType, ProcessingOutcome};
use FolioScan::error::Result;
use FolioScan::pipeline::normalizer::normalize;
use FolioScan::pipeline::writers::parquet_writer::table_path;
use FolioScan::pipeline::writers::tables::columns;
use FolioScan::pipeline::writers::{BaseWriter, JsonResultsWriter, ParquetWriter};

fn outcomes() -> Vec<ProcessingOutcome> {
    vec![
        normalize(work_order("1001", "01-02-24"), "wo.pdf").into(),
        normalize(uninstallation("D-7", "03-02-24"), "un.pdf").into(),
        ProcessingOutcome::failed("bad.pdf", "document type not recognized"),
        normalize(work_order("", "05-02-24"), "wo2.pdf").into(),
    ]
}

fn read_rows(path: &std::path::Path) -> Vec<parquet::record::Row> {
    let reader = SerializedFileReader::new(File::open(path).unwrap()).unwrap();
    reader.get_row_iter(None).unwrap().map(|r| r.unwrap()).collect()
}

#[test]
fn test_parquet_tables_per_type() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut writer = ParquetWriter::new(dir.path())?;
    writer.write_batch(&outcomes())?;
    writer.close()?;

    let work_orders = table_path(dir.path(), DocumentType::WorkOrder);
    let rows = read_rows(&work_orders);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get_string(0).unwrap(), "1001");
    // archivo is the last work order column
    let archivo = columns(DocumentType::WorkOrder).len() - 1;
    assert_eq!(rows[0].get_string(archivo).unwrap(), "1001.pdf");
    assert_eq!(rows[1].get_string(archivo).unwrap(), "wo2.pdf");

    let uninstallations = read_rows(&table_path(dir.path(), DocumentType::Uninstallation));
    assert_eq!(uninstallations.len(), 1);
    assert_eq!(uninstallations[0].get_string(0).unwrap(), "D-7");

    // No documents of these types, so no tables.
    assert!(!table_path(dir.path(), DocumentType::SupplyRequest).exists());
    assert!(!table_path(dir.path(), DocumentType::Installation).exists());
    Ok(())
}

#[test]
fn test_parquet_schema_follows_column_order() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut writer = ParquetWriter::new(dir.path())?;
    writer.write_batch(&outcomes())?;
    writer.write_batch(&outcomes()[..1])?;
    writer.close()?;

    let reader = SerializedFileReader::new(
        File::open(table_path(dir.path(), DocumentType::WorkOrder)).unwrap(),
    )
    .unwrap();
    let schema = reader.metadata().file_metadata().schema_descr();
    let names: Vec<String> = schema.columns().iter().map(|c| c.name().to_string()).collect();
    assert_eq!(names, columns(DocumentType::WorkOrder));
    assert_eq!(reader.metadata().file_metadata().num_rows(), 3);
    Ok(())
}

#[test]
fn test_json_results_keep_failures() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("out").join("results.json");
    let mut writer = JsonResultsWriter::new(&path);
    writer.write_batch(&outcomes())?;
    writer.close()?;

    let content = std::fs::read_to_string(&path)?;
    let parsed: Vec<ProcessingOutcome> = serde_json::from_str(&content)?;
    assert_eq!(parsed, outcomes());

    let raw: serde_json::Value = serde_json::from_str(&content)?;
    assert_eq!(raw[2]["status"], "failed");
    assert_eq!(raw[2]["originalFileName"], "bad.pdf");
    assert_eq!(raw[0]["document"]["type"], "workOrder");
    Ok(())
}
