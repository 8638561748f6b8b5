//! File system storage operations
//!
//! This module handles the CSV output tree:
//! - Output root preparation (wiped at the start of every run)
//! - Per-table CSV file writing

mod csv_writer;
mod output;

pub use csv_writer::CsvWriter;
pub use output::OutputDirectory;
