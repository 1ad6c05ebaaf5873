//! Copies the input files of one document type into a folder, each renamed to
//! its document's `archivo`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::data_model::{DocumentType, InputFile, ProcessedDocument, ProcessingOutcome};
use crate::error::{PipelineError, Result};
use crate::utils::prometheus_metrics::ARCHIVE_ERRORS_TOTAL;

/// Successful documents of `document_type` paired with their input file, in
/// result order. Documents whose file is missing are skipped with a warning.
pub fn pair_with_files<'a>(
    document_type: DocumentType,
    outcomes: &'a [ProcessingOutcome],
    files: &'a [InputFile],
) -> Vec<(&'a ProcessedDocument, &'a InputFile)> {
    outcomes
        .iter()
        .filter_map(ProcessingOutcome::document)
        .filter(|doc| doc.document_type() == document_type)
        .filter_map(|doc| {
            let file = files.iter().find(|f| f.name() == doc.original_file_name());
            if file.is_none() {
                warn!(file = %doc.original_file_name(), "No input file for document. Left out of archive.");
            }
            file.map(|f| (doc, f))
        })
        .collect()
}

/// Replaces path separators so an extracted identifier cannot escape the folder.
fn entry_name(archivo: &str) -> String {
    let cleaned: String = archivo
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "document.pdf".to_string()
    } else {
        cleaned
    }
}

/// `name`, or `stem (n).ext` for the first `n` not already taken.
fn unique_name(name: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(name) {
        return name.to_string();
    }
    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
        _ => (name, ""),
    };
    (1..)
        .map(|n| format!("{} ({}){}", stem, n, ext))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}

/// Writes per-type archive folders under a root directory.
pub struct DirectoryArchive {
    root: PathBuf,
}

impl DirectoryArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryArchive { root: root.into() }
    }

    pub fn folder(&self, document_type: DocumentType) -> PathBuf {
        self.root.join(document_type.slug())
    }

    /// Writes `<root>/<type>/` from the given pairs and returns the folder.
    ///
    /// Any failure is reported as [`PipelineError::ArchiveError`]; results in
    /// memory are never touched.
    pub fn write(
        &self,
        document_type: DocumentType,
        pairs: &[(&ProcessedDocument, &InputFile)],
    ) -> Result<PathBuf> {
        self.write_entries(document_type, pairs).map_err(|e| {
            ARCHIVE_ERRORS_TOTAL.inc();
            match e {
                err @ PipelineError::ArchiveError { .. } => err,
                other => PipelineError::ArchiveError {
                    document_type,
                    message: other.to_string(),
                },
            }
        })
    }

    fn write_entries(
        &self,
        document_type: DocumentType,
        pairs: &[(&ProcessedDocument, &InputFile)],
    ) -> Result<PathBuf> {
        let folder = self.folder(document_type);
        fs::create_dir_all(&folder)?;

        let mut taken: HashSet<String> = HashSet::new();
        for (document, file) in pairs {
            if document.document_type() != document_type {
                return Err(PipelineError::ArchiveError {
                    document_type,
                    message: format!(
                        "'{}' is a {} document",
                        document.original_file_name(),
                        document.document_type()
                    ),
                });
            }
            let name = unique_name(&entry_name(document.archivo()), &taken);
            write_entry(&folder, &name, file.bytes())?;
            taken.insert(name);
        }

        info!(folder = %folder.display(), entries = taken.len(), "Wrote archive");
        Ok(folder)
    }
}

fn write_entry(folder: &Path, name: &str, bytes: &[u8]) -> Result<()> {
    fs::write(folder.join(name), bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collisions_get_a_counter_suffix() {
        let mut taken = HashSet::new();
        assert_eq!(unique_name("A1.pdf", &taken), "A1.pdf");
        taken.insert("A1.pdf".to_string());
        assert_eq!(unique_name("A1.pdf", &taken), "A1 (1).pdf");
        taken.insert("A1 (1).pdf".to_string());
        assert_eq!(unique_name("A1.pdf", &taken), "A1 (2).pdf");
    }

    #[test]
    fn separators_are_replaced() {
        assert_eq!(entry_name("12/34.pdf"), "12_34.pdf");
        assert_eq!(entry_name(".."), "document.pdf");
    }
}
