//! Project mapping file
//!
//! Optional JSON5 file (`--mapping-file`) that renames explore models for a
//! particular Looker instance, e.g. `system__activity` to `i__looker`.

use eyre::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProjectMapping {
    /// Configured model name to the model name on the instance
    #[serde(default)]
    pub models: BTreeMap<String, String>,
}

impl ProjectMapping {
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read mapping file: {}", path.as_ref().display())
        })?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse mapping file: {}", path.as_ref().display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        json5::from_str(content).context("Failed to parse JSON5")
    }

    /// Resolve a configured model name
    pub fn model<'a>(&'a self, model: &'a str) -> &'a str {
        self.models.get(model).map(|m| m.as_str()).unwrap_or(model)
    }
}
