//! Schema file management
//!
//! The schema file (`schema.yaml`) maps each explore to the query that
//! extracts it and to the column names written to CSV.
//!
//! Example format:
//! ```yaml
//! query:
//!   model: system__activity
//!   view: query
//!   fields: [query.id, query.created_time, query.model]
//!   count_measure: query.count
//!   primary_key: query.id
//!   schema:
//!     - name: id
//!       type: INTEGER
//!     - name: created_time
//!     - name: model
//! ```

use eyre::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Output column declaration; position matters, names are what get written
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SchemaColumn {
    pub name: String,
    #[serde(default, rename = "type")]
    pub data_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A primary key is either one field or a composite of several
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PrimaryKey {
    Single(String),
    Composite(Vec<String>),
}

/// One explore entry in the schema file
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TableSchema {
    pub model: String,
    pub view: String,
    pub fields: Vec<String>,
    #[serde(default)]
    pub filters: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub count_measure: Option<String>,
    #[serde(default)]
    pub cursor_field: Option<String>,
    #[serde(default)]
    pub primary_key: Option<PrimaryKey>,
    #[serde(default)]
    pub batch_cursor_field: Option<String>,
    #[serde(default)]
    pub schema: Vec<SchemaColumn>,
}

/// Schema file: explore name to table schema
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SchemaFile {
    pub tables: BTreeMap<String, TableSchema>,
}

impl SchemaFile {
    pub fn get(&self, table: &str) -> Option<&TableSchema> {
        self.tables.get(table)
    }

    /// Read schema from YAML file
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read schema file: {}", path.as_ref().display())
        })?;

        serde_yaml::from_str(&content).with_context(|| {
            format!("Failed to parse schema file: {}", path.as_ref().display())
        })
    }
}
