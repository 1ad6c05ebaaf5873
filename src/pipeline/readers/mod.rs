// src/pipeline/readers/mod.rs

pub mod base_reader;
pub mod pdf_reader;

pub use base_reader::BaseReader;
pub use pdf_reader::PdfReader;
