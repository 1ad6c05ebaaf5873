use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, RecordBatch, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::properties::WriterProperties;
use tracing::{debug, info};

use crate::data_model::{DocumentType, ProcessingOutcome};
use crate::error::Result;
use crate::pipeline::writers::tables::{columns, ExportTables};
use crate::pipeline::writers::BaseWriter;

fn create_schema(document_type: DocumentType) -> SchemaRef {
    Arc::new(Schema::new(
        columns(document_type)
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, false))
            .collect::<Vec<_>>(),
    ))
}

/// Path of the table for `document_type` under `output_dir`.
pub fn table_path(output_dir: &Path, document_type: DocumentType) -> PathBuf {
    output_dir.join(format!("{}.parquet", document_type.slug()))
}

/// Writes successful documents to one Parquet file per document type.
///
/// A type's file is only created once a document of that type is written, so
/// types absent from the results leave no empty file behind.
pub struct ParquetWriter {
    output_dir: PathBuf,
    writers: HashMap<DocumentType, (SchemaRef, ArrowWriter<File>)>,
    rows_written: HashMap<DocumentType, usize>,
}

impl ParquetWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(ParquetWriter {
            output_dir,
            writers: HashMap::new(),
            rows_written: HashMap::new(),
        })
    }

    fn writer_for(
        &mut self,
        document_type: DocumentType,
    ) -> Result<&mut (SchemaRef, ArrowWriter<File>)> {
        match self.writers.entry(document_type) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let path = table_path(&self.output_dir, document_type);
                debug!(path = %path.display(), "Opening Parquet table");
                let schema = create_schema(document_type);
                let file = File::create(&path)?;
                let props = WriterProperties::builder().build();
                let writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
                Ok(entry.insert((schema, writer)))
            }
        }
    }
}

impl BaseWriter for ParquetWriter {
    fn write_batch(&mut self, outcomes: &[ProcessingOutcome]) -> Result<()> {
        let tables = ExportTables::from_outcomes(outcomes);
        for document_type in DocumentType::ALL {
            let rows = tables.rows(document_type);
            if rows.is_empty() {
                continue;
            }

            let column_count = columns(document_type).len();
            let mut builders: Vec<StringBuilder> =
                (0..column_count).map(|_| StringBuilder::new()).collect();
            for row in &rows {
                for (builder, value) in builders.iter_mut().zip(row) {
                    builder.append_value(value);
                }
            }
            let arrays: Vec<ArrayRef> = builders
                .iter_mut()
                .map(|b| Arc::new(b.finish()) as ArrayRef)
                .collect();

            let (schema, writer) = self.writer_for(document_type)?;
            let batch = RecordBatch::try_new(schema.clone(), arrays)?;
            writer.write(&batch)?;
            *self.rows_written.entry(document_type).or_default() += rows.len();
        }
        Ok(())
    }

    fn close(self) -> Result<()> {
        for (document_type, (_, writer)) in self.writers {
            writer.close()?;
            info!(
                table = document_type.slug(),
                rows = self.rows_written.get(&document_type).copied().unwrap_or(0),
                "Closed Parquet table"
            );
        }
        Ok(())
    }
}
