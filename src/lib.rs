//! Looker Activity Extractor
//!
//! Pulls Looker system-activity explores into CSV files, one table at a time,
//! with cursor-ordered batches for tables too large for a single query.

pub mod cli;
pub mod client;
pub mod config;
pub mod etl;
pub mod extract;
pub mod storage;

// Re-exports for convenience
pub use client::{Auth, LookerClient, QueryApi};
pub use config::{Settings, TableCatalog, TableDescriptor};
pub use etl::{Extractor, Loader, Transformer, drain};
pub use extract::{ExtractError, ExtractionMode, ExtractionSummary, Frame, TableExtractor};
pub use storage::{CsvWriter, OutputDirectory};
