//! Table configuration store
//!
//! Resolves an explore name to an immutable [`TableDescriptor`] by combining
//! the schema file, the cursor file and the optional project mapping.

use super::{CursorFile, CursorSettings, PrimaryKey, ProjectMapping, SchemaFile};
use crate::extract::ExtractError;
use eyre::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// Start overrides applied when a table runs in batch mode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CursorOverrides {
    pub days_ago: Option<i64>,
    pub manual_initial_value: Option<String>,
}

impl From<&CursorSettings> for CursorOverrides {
    fn from(settings: &CursorSettings) -> Self {
        Self {
            days_ago: settings.days_ago_to_start_pull,
            manual_initial_value: settings.cursor_manual_initial_value.clone(),
        }
    }
}

/// Everything needed to extract one explore. Read-only for the whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDescriptor {
    pub table: String,
    pub model: String,
    pub view: String,
    pub fields: Vec<String>,
    pub filters: BTreeMap<String, String>,
    pub count_measure: Option<String>,
    pub cursor_field: Option<String>,
    pub primary_key: Option<PrimaryKey>,
    pub batch_cursor_field: Option<String>,
    /// Output column names, matched to result columns by position
    pub schema_columns: Vec<String>,
    pub cursor_overrides: CursorOverrides,
}

impl TableDescriptor {
    /// Minimal descriptor for a full extraction of `view`
    pub fn new(
        table: impl Into<String>,
        model: impl Into<String>,
        view: impl Into<String>,
        fields: Vec<String>,
        schema_columns: Vec<String>,
    ) -> Self {
        Self {
            table: table.into(),
            model: model.into(),
            view: view.into(),
            fields,
            filters: BTreeMap::new(),
            count_measure: None,
            cursor_field: None,
            primary_key: None,
            batch_cursor_field: None,
            schema_columns,
            cursor_overrides: CursorOverrides::default(),
        }
    }
}

pub struct TableCatalog {
    schema: SchemaFile,
    schema_name: String,
    cursors: CursorFile,
    mapping: ProjectMapping,
}

impl TableCatalog {
    pub fn new(schema: SchemaFile, cursors: CursorFile, mapping: ProjectMapping) -> Self {
        Self {
            schema,
            schema_name: "schema.yaml".to_string(),
            cursors,
            mapping,
        }
    }

    /// Load the catalog from disk.
    ///
    /// The cursor file is optional; a missing one means no overrides.
    pub fn load(
        schema_path: impl AsRef<Path>,
        cursor_path: impl AsRef<Path>,
        mapping_path: Option<&Path>,
    ) -> Result<Self> {
        let schema_path = schema_path.as_ref();
        log::debug!("Loading schema from {}", schema_path.display());
        let schema = SchemaFile::read(schema_path)?;

        let cursor_path = cursor_path.as_ref();
        let cursors = if cursor_path.exists() {
            log::debug!("Loading cursor settings from {}", cursor_path.display());
            CursorFile::read(cursor_path)?
        } else {
            log::debug!(
                "No cursor file at {}, using cursor defaults",
                cursor_path.display()
            );
            CursorFile::new()
        };

        let mapping = match mapping_path {
            Some(path) => ProjectMapping::read(path)?,
            None => ProjectMapping::default(),
        };

        let schema_name = schema_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| schema_path.display().to_string());

        Ok(Self {
            schema_name,
            ..Self::new(schema, cursors, mapping)
        })
    }

    /// Resolve a table to its descriptor.
    ///
    /// # Errors
    /// [`ExtractError::TableNotFound`] when the schema has no such table and
    /// [`ExtractError::Configuration`] when a required part is empty.
    pub fn descriptor(&self, table: &str) -> Result<TableDescriptor> {
        let schema = self
            .schema
            .get(table)
            .ok_or_else(|| ExtractError::TableNotFound {
                table: table.to_string(),
                file: self.schema_name.clone(),
            })?;

        if schema.fields.is_empty() {
            return Err(ExtractError::configuration(table, "no fields configured").into());
        }
        if schema.schema.is_empty() {
            return Err(
                ExtractError::configuration(table, "no schema columns configured").into(),
            );
        }

        let cursor_overrides = self
            .cursors
            .get(table)
            .map(CursorOverrides::from)
            .unwrap_or_default();

        Ok(TableDescriptor {
            filters: schema.filters.clone().unwrap_or_default(),
            count_measure: schema.count_measure.clone(),
            cursor_field: schema.cursor_field.clone(),
            primary_key: schema.primary_key.clone(),
            batch_cursor_field: schema.batch_cursor_field.clone(),
            cursor_overrides,
            ..TableDescriptor::new(
                table,
                self.mapping.model(&schema.model),
                schema.view.as_str(),
                schema.fields.clone(),
                schema.schema.iter().map(|c| c.name.clone()).collect(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SchemaColumn, TableSchema};

    fn column(name: &str) -> SchemaColumn {
        SchemaColumn {
            name: name.to_string(),
            data_type: None,
            description: None,
        }
    }

    fn query_schema() -> TableSchema {
        TableSchema {
            model: "system__activity".to_string(),
            view: "query".to_string(),
            fields: vec!["query.id".to_string(), "query.model".to_string()],
            filters: None,
            count_measure: Some("query.count".to_string()),
            cursor_field: None,
            primary_key: Some(PrimaryKey::Single("query.id".to_string())),
            batch_cursor_field: None,
            schema: vec![column("id"), column("model")],
        }
    }

    #[test]
    fn test_descriptor_resolution() {
        let mut schema = SchemaFile::default();
        schema.tables.insert("query".to_string(), query_schema());

        let mut cursors = CursorFile::new();
        cursors.tables.insert(
            "query".to_string(),
            CursorSettings {
                days_ago_to_start_pull: None,
                cursor_manual_initial_value: Some("1000".to_string()),
            },
        );

        let mapping = ProjectMapping::parse(r#"{models: {system__activity: "i__looker"}}"#)
            .unwrap();
        let catalog = TableCatalog::new(schema, cursors, mapping);

        let descriptor = catalog.descriptor("query").unwrap();
        assert_eq!(descriptor.model, "i__looker");
        assert_eq!(descriptor.view, "query");
        assert_eq!(descriptor.schema_columns, vec!["id", "model"]);
        assert!(descriptor.filters.is_empty());
        assert_eq!(
            descriptor.cursor_overrides.manual_initial_value.as_deref(),
            Some("1000")
        );
    }

    #[test]
    fn test_missing_table() {
        let catalog = TableCatalog::new(
            SchemaFile::default(),
            CursorFile::new(),
            ProjectMapping::default(),
        );

        let err = catalog.descriptor("role").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExtractError>(),
            Some(ExtractError::TableNotFound { .. })
        ));
        assert_eq!(err.to_string(), "Table role is not found in schema.yaml file.");
    }

    #[test]
    fn test_missing_schema_columns() {
        let mut table = query_schema();
        table.schema.clear();
        let mut schema = SchemaFile::default();
        schema.tables.insert("query".to_string(), table);
        let catalog = TableCatalog::new(schema, CursorFile::new(), ProjectMapping::default());

        let err = catalog.descriptor("query").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExtractError>(),
            Some(ExtractError::Configuration { .. })
        ));
    }
}
