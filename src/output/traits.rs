//! Output writer trait and errors

use crate::model::TutorRecord;
use thiserror::Error;

/// Errors that can occur while writing the final record batch
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for the records of a run
///
/// The whole batch is handed over once, after every filter pair has been
/// processed. Implementations replace any previous output.
pub trait OutputWriter {
    fn write_records(&mut self, records: &[TutorRecord]) -> OutputResult<()>;
}

/// Keeps records in memory; handy for embedding the crawler
#[derive(Debug, Default)]
pub struct MemoryOutput {
    pub records: Vec<TutorRecord>,
}

impl OutputWriter for MemoryOutput {
    fn write_records(&mut self, records: &[TutorRecord]) -> OutputResult<()> {
        self.records = records.to_vec();
        Ok(())
    }
}
