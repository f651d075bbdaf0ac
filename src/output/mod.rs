//! Output module for persisting harvested records
//!
//! This module handles:
//! - The `OutputWriter` seam the coordinator hands its final batch to
//! - Writing the fixed-header CSV file
//! - Recording and printing run statistics

mod csv_output;
pub mod stats;
mod traits;

pub use csv_output::{write_csv, CsvOutput};
pub use stats::{print_statistics, HarvestStatistics};
pub use traits::{MemoryOutput, OutputError, OutputResult, OutputWriter};
