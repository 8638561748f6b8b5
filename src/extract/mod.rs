//! Explore extraction engine
//!
//! Probing, cursor handling, query building and execution, and the
//! per-table [`TableExtractor`] loop that ties them together.

mod cursor;
mod error;
mod executor;
mod frame;
mod prober;
mod query;
mod state;
mod table;

pub use cursor::{
    CursorInit, CursorKind, CursorValue, ID_CURSOR_FIELD, START_ID, cursor_column,
    resolve_cursor_field,
};
pub use error::ExtractError;
pub use executor::BatchExecutor;
pub use frame::{ColumnRemapper, Frame};
pub use prober::probe_row_count;
pub use query::{build_query, count_query};
pub use state::ExtractionState;
pub use table::{ExtractionMode, ExtractionSummary, TableExtractor};
