pub mod archive_writer;
pub mod base_writer;
pub mod json_writer;
pub mod parquet_writer;
pub mod tables;

pub use archive_writer::{pair_with_files, DirectoryArchive};
pub use base_writer::BaseWriter;
pub use json_writer::JsonResultsWriter;
pub use parquet_writer::ParquetWriter;
pub use tables::ExportTables;
