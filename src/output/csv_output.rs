//! CSV output handler
//!
//! Writes every record under a fixed header. The file is created (or
//! truncated) on each write, so a rerun replaces the previous dataset.

use crate::model::TutorRecord;
use crate::output::traits::{OutputResult, OutputWriter};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes records to a CSV file
#[derive(Debug, Clone)]
pub struct CsvOutput {
    path: PathBuf,
}

impl CsvOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputWriter for CsvOutput {
    fn write_records(&mut self, records: &[TutorRecord]) -> OutputResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = std::fs::File::create(&self.path)?;
        write_csv(file, records)?;

        tracing::info!(
            "Wrote {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Serializes records with the fixed header to any writer
///
/// The header row is written even when there are no records.
pub fn write_csv<W: Write>(writer: W, records: &[TutorRecord]) -> OutputResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(TutorRecord::HEADERS)?;
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}
