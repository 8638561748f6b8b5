//! Cursor file management
//!
//! The cursor file (`cursor.yaml`) carries per-table overrides for where a
//! batch extraction starts. Tables without an entry use the cursor default.
//!
//! Example format:
//! ```yaml
//! history:
//!   days_ago_to_start_pull: 30
//! query:
//!   cursor_manual_initial_value: 150000
//! ```

use eyre::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::Path;

/// Start overrides for one table
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CursorSettings {
    /// Start this many days before today, at midnight
    #[serde(default)]
    pub days_ago_to_start_pull: Option<i64>,
    /// Start at this exact value
    #[serde(
        default,
        alias = "cursor_initial_value",
        deserialize_with = "scalar_as_string"
    )]
    pub cursor_manual_initial_value: Option<String>,
}

/// Cursor file: explore name to cursor settings
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CursorFile {
    pub tables: BTreeMap<String, CursorSettings>,
}

impl CursorFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, table: &str) -> Option<&CursorSettings> {
        self.tables.get(table)
    }

    /// Read cursor settings from YAML file
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read cursor file: {}", path.as_ref().display())
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).with_context(|| {
            format!("Failed to parse cursor file: {}", path.as_ref().display())
        })
    }
}

// YAML gives integers for id cursors and strings for timestamps; keep both verbatim.
fn scalar_as_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_yaml::Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a scalar cursor value, got {:?}",
            other
        ))),
    }
}
