use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use tracing::info;

use crate::data_model::ProcessingOutcome;
use crate::error::Result;
use crate::pipeline::writers::BaseWriter;

/// Writes every outcome, failures included, as one pretty-printed JSON array.
/// Nothing touches the disk until [`close`](BaseWriter::close).
pub struct JsonResultsWriter {
    path: PathBuf,
    outcomes: Vec<ProcessingOutcome>,
}

impl JsonResultsWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonResultsWriter {
            path: path.into(),
            outcomes: Vec::new(),
        }
    }
}

impl BaseWriter for JsonResultsWriter {
    fn write_batch(&mut self, outcomes: &[ProcessingOutcome]) -> Result<()> {
        self.outcomes.extend_from_slice(outcomes);
        Ok(())
    }

    fn close(self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(writer, &self.outcomes)?;
        info!(path = %self.path.display(), count = self.outcomes.len(), "Wrote results");
        Ok(())
    }
}
