use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::data_model::InputFile;
use crate::error::{PipelineError, Result};
use crate::pipeline::readers::BaseReader;

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Reads scanned PDFs from explicit file paths and from directories.
///
/// Directories contribute their `*.pdf` entries (not recursive), sorted by
/// name. Files are yielded in argument order. Input files are looked up by
/// name later on, so a second file with an already-seen name is skipped.
pub struct PdfReader {
    paths: Vec<PathBuf>,
}

impl PdfReader {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        PdfReader { paths }
    }

    fn resolve(&self) -> Result<Vec<PathBuf>> {
        let mut resolved = Vec::new();
        for path in &self.paths {
            if path.is_dir() {
                let mut entries: Vec<PathBuf> = fs::read_dir(path)?
                    .filter_map(|entry| entry.ok().map(|e| e.path()))
                    .filter(|p| p.is_file() && is_pdf(p))
                    .collect();
                entries.sort();
                debug!(dir = %path.display(), count = entries.len(), "Found PDFs in directory");
                resolved.extend(entries);
            } else if path.is_file() {
                resolved.push(path.clone());
            } else {
                return Err(PipelineError::ConfigError(format!(
                    "Input path '{}' does not exist",
                    path.display()
                )));
            }
        }

        let mut seen = HashSet::new();
        resolved.retain(|p| {
            let name = p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let fresh = seen.insert(name.clone());
            if !fresh {
                warn!(path = %p.display(), "Skipping file with duplicate name '{}'", name);
            }
            fresh
        });
        Ok(resolved)
    }

    /// Reads every file eagerly.
    pub fn read_all(&self) -> Result<Vec<InputFile>> {
        self.read_files()?.collect()
    }
}

impl BaseReader for PdfReader {
    fn read_files(&self) -> Result<Box<dyn Iterator<Item = Result<InputFile>>>> {
        let paths = self.resolve()?;
        Ok(Box::new(paths.into_iter().map(|path| {
            let bytes = fs::read(&path)?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(InputFile::new(name, bytes))
        })))
    }
}
