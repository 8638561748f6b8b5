//! CSV file output

use crate::extract::Frame;
use eyre::{Context, Result};
use std::path::{Path, PathBuf};

/// Write frames as CSV files into one table directory
///
/// Files are UTF-8, comma-delimited, quoted only where needed, with the frame
/// columns as header and no index column.
pub struct CsvWriter {
    path: PathBuf,
}

impl CsvWriter {
    /// The directory is created on first write
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Write a frame to `file_name`, replacing any existing file
    pub fn write(&self, file_name: &str, frame: &Frame) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.path)
            .with_context(|| format!("Failed to create directory: {}", self.path.display()))?;

        let path = self.path.join(file_name);
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Necessary)
            .from_path(&path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

        writer.write_record(frame.columns())?;
        for row in frame.rows() {
            writer.write_record(row)?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;

        Ok(path)
    }
}
