//! Tabular query results
//!
//! A [`Frame`] is the parsed form of one CSV result: ordered column names and
//! rows of cells. Cells stay as the text Looker returned.

use crate::etl::Transformer;
use eyre::{Context, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Frame {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Parse raw CSV text whose first record is the header.
    pub fn from_csv(text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());

        let columns = reader
            .headers()
            .with_context(|| "Failed to read CSV header")?
            .iter()
            .map(str::to_string)
            .collect();

        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, _>>()
            .with_context(|| "Failed to parse CSV result")?;

        Ok(Self::new(columns, rows))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value of `column` in the last row, if there is a last row
    pub fn last_value(&self, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows
            .last()
            .and_then(|row| row.get(index))
            .map(String::as_str)
    }
}

/// Renames result columns to the configured schema names, by position.
///
/// The API's column order must match the schema's declared order; names are
/// never compared.
pub struct ColumnRemapper {
    names: Vec<String>,
}

impl ColumnRemapper {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }
}

impl Transformer for ColumnRemapper {
    type Input = Frame;
    type Output = Frame;

    fn transform(&self, mut input: Self::Input) -> Result<Self::Output> {
        // A body with no header at all carries nothing to misalign
        if input.columns.is_empty() && input.rows.is_empty() {
            input.columns = self.names.clone();
            return Ok(input);
        }

        if input.columns.len() != self.names.len() {
            eyre::bail!(
                "Length mismatch: result has {} columns, schema declares {}",
                input.columns.len(),
                self.names.len()
            );
        }

        input.columns = self.names.clone();
        Ok(input)
    }
}
