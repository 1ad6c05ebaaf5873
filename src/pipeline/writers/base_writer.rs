use crate::data_model::ProcessingOutcome;
use crate::error::Result;

/// Trait for writing batches of processing outcomes to an output sink.
pub trait BaseWriter {
    /// Write a batch of outcomes to the sink. Writers decide which outcomes
    /// they keep; table writers skip failures.
    fn write_batch(&mut self, outcomes: &[ProcessingOutcome]) -> Result<()>;

    /// Finalize and close the output writer.
    fn close(self) -> Result<()>;
}
