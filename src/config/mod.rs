//! Configuration inputs
//!
//! Runtime [`Settings`], the schema and cursor files, the optional project
//! mapping, and the [`TableCatalog`] that turns them into descriptors.

mod catalog;
mod cursor;
mod mapping;
mod schema;
mod settings;

pub use catalog::{CursorOverrides, TableCatalog, TableDescriptor};
pub use cursor::{CursorFile, CursorSettings};
pub use mapping::ProjectMapping;
pub use schema::{PrimaryKey, SchemaColumn, SchemaFile, TableSchema};
pub use settings::{
    DEFAULT_CURSOR_INITIAL_VALUE, DEFAULT_OUTPUT_DIR, DEFAULT_TABLES, POLL_INTERVAL,
    QUERY_TIMEOUT, QUERY_TIMEZONE, ROW_LIMIT, Settings,
};
