//! Per-table extraction
//!
//! A [`TableExtractor`] probes its table once, picks full or batch mode, and
//! then serves as a fetch/dump worker for [`etl::drain`]. Batches are strictly
//! sequential because each query starts where the previous batch ended.

use super::cursor::CursorInit;
use super::query::build_query;
use super::{BatchExecutor, ColumnRemapper, ExtractError, ExtractionState, Frame, probe_row_count};
use crate::client::QueryApi;
use crate::config::{Settings, TableDescriptor};
use crate::etl::{self, Extractor, Loader, Transformer};
use crate::storage::CsvWriter;
use chrono::NaiveDate;
use eyre::Result;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

/// Extraction strategy, fixed when the extractor is built
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionMode {
    /// One query, one file, truncated at the row limit
    Full,
    /// Cursor-ordered pages, one numbered file per page
    Batch(CursorInit),
}

/// Outcome of one table's extraction
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionSummary {
    pub table: String,
    pub batch_mode: bool,
    pub files: Vec<PathBuf>,
    pub total_records: usize,
    /// A full pull hit the row limit, so rows past it were dropped
    pub truncated: bool,
}

pub struct TableExtractor<'a, C> {
    descriptor: &'a TableDescriptor,
    settings: &'a Settings,
    executor: BatchExecutor<'a, C>,
    remapper: ColumnRemapper,
    writer: CsvWriter,
    mode: ExtractionMode,
    state: ExtractionState,
    files: Vec<PathBuf>,
    truncated: bool,
}

impl<'a, C: QueryApi> TableExtractor<'a, C> {
    /// Probe the table's row count and set up the matching mode.
    ///
    /// # Errors
    /// Fails when the count query fails or the cursor cannot be configured.
    pub async fn try_new(
        client: &'a C,
        descriptor: &'a TableDescriptor,
        settings: &'a Settings,
        table_dir: impl AsRef<Path>,
    ) -> Result<Self> {
        let executor = BatchExecutor::new(client, settings);
        let row_count = probe_row_count(&executor, descriptor).await?;
        let today = chrono::Local::now().date_naive();
        Self::with_row_count(executor, descriptor, settings, table_dir, row_count, today)
    }

    fn with_row_count(
        executor: BatchExecutor<'a, C>,
        descriptor: &'a TableDescriptor,
        settings: &'a Settings,
        table_dir: impl AsRef<Path>,
        row_count: Option<i64>,
        today: NaiveDate,
    ) -> Result<Self> {
        // An empty explore needs no cursor
        let (mode, state) = match row_count {
            Some(count) if count > 0 => {
                let cursor =
                    CursorInit::resolve(descriptor, &settings.cursor_initial_value, today)?;
                if !descriptor
                    .schema_columns
                    .iter()
                    .any(|c| c == cursor.column())
                {
                    return Err(ExtractError::configuration(
                        &descriptor.table,
                        format!(
                            "cursor column '{}' is not among the schema columns",
                            cursor.column()
                        ),
                    )
                    .into());
                }
                log::info!(
                    "Cursor field is {} ({:?}), starting at [{}]",
                    cursor.field.cyan(),
                    cursor.kind,
                    cursor.initial_value
                );
                let state = ExtractionState::batch(count, &cursor);
                (ExtractionMode::Batch(cursor), state)
            }
            _ => (ExtractionMode::Full, ExtractionState::full()),
        };

        Ok(Self {
            descriptor,
            settings,
            executor,
            remapper: ColumnRemapper::new(descriptor.schema_columns.clone()),
            writer: CsvWriter::new(table_dir),
            mode,
            state,
            files: Vec::new(),
            truncated: false,
        })
    }

    pub fn mode(&self) -> &ExtractionMode {
        &self.mode
    }

    pub fn state(&self) -> &ExtractionState {
        &self.state
    }

    /// Run fetch/dump cycles until the table is exhausted
    pub async fn run(mut self) -> Result<ExtractionSummary> {
        let stats = etl::drain(&mut self).await?;
        log::info!(
            "Extracted {} record(s) from {} into {} file(s)",
            self.state.total_records,
            self.descriptor.table.bright_white(),
            stats.batches
        );

        Ok(ExtractionSummary {
            table: self.descriptor.table.clone(),
            batch_mode: matches!(self.mode(), ExtractionMode::Batch(_)),
            total_records: self.state().total_records,
            files: self.files,
            truncated: self.truncated,
        })
    }
}

impl<C: QueryApi> Extractor for TableExtractor<'_, C> {
    type Item = Frame;

    async fn fetch(&mut self) -> Result<Option<Frame>> {
        if self.state.is_done() {
            return Ok(None);
        }

        let descriptor = self.descriptor;
        let spec = build_query(descriptor, self.settings, &self.state);
        match &self.state.cursor_value {
            Some(value) if self.state.is_batch_mode() => log::info!(
                "Extracting using cursor for view [{}] model [{}], cursor value [{}]",
                descriptor.view,
                descriptor.model,
                value
            ),
            _ => log::info!("Extracting without a cursor for view [{}]", descriptor.view),
        }

        let raw = self.executor.execute(&spec).await?;
        let frame = self.remapper.transform(Frame::from_csv(&raw)?)?;
        let rows = frame.len();
        let limit = self.settings.row_limit;

        match &self.mode {
            ExtractionMode::Full => {
                if rows == limit {
                    self.truncated = true;
                    log::warn!(
                        "View [{}] has more than {} rows but no field can be used as a cursor \
                         for batch extraction; it will be truncated to {} rows",
                        descriptor.table,
                        limit,
                        limit
                    );
                }
            }
            ExtractionMode::Batch(cursor) => {
                let next = match frame.last_value(cursor.column()) {
                    Some(raw) => cursor.kind.parse(raw)?,
                    None => None,
                };
                // Rows whose last cursor cell is empty cannot be paged past
                let cursor_missing = next.is_none() && !frame.is_empty();
                self.state.advance_cursor(next);

                if cursor_missing {
                    log::warn!(
                        "Last row of view [{}] has no {} value; stopping after this batch",
                        descriptor.view,
                        cursor.field
                    );
                    self.state.is_last_batch = Some(true);
                } else if self.state.file_sequence >= 0 {
                    // Checks below only apply once a batch has been written
                    if frame.is_empty() {
                        log::info!("No rows after cursor, end of extraction");
                        self.state.finish();
                        return Ok(None);
                    }
                    if self.state.cursor_stalled() {
                        log::warn!(
                            "Cursor {} did not advance past [{}]; stopping to avoid \
                             re-fetching the same batch",
                            cursor.field,
                            self.state
                                .cursor_value
                                .as_ref()
                                .map(ToString::to_string)
                                .unwrap_or_default()
                        );
                        self.state.finish();
                        return Ok(None);
                    }
                    if rows < limit {
                        self.state.is_last_batch = Some(true);
                    }
                }
            }
        }

        Ok(Some(frame))
    }
}

impl<C: QueryApi> Loader for TableExtractor<'_, C> {
    type Item = Frame;

    fn dump(&mut self, frame: Frame) -> Result<usize> {
        let table = &self.descriptor.table;
        let file_name = match &self.mode {
            ExtractionMode::Batch(_) => {
                format!("{}_{}.csv", table, self.state.next_file_sequence())
            }
            ExtractionMode::Full => format!("{}.csv", table),
        };

        let path = self.writer.write(&file_name, &frame)?;
        let rows = frame.len();
        log::info!(
            "Successfully extracted explore table '{}': {} rows, output file '{}'",
            table,
            rows,
            path.display().bright_black()
        );

        self.state.total_records += rows;
        self.files.push(path);

        if rows < self.settings.row_limit || self.state.is_done() || !self.state.is_batch_mode() {
            self.state.finish();
            log::debug!("End of extraction for {}", table);
        } else {
            self.state.expect_more();
        }

        Ok(rows)
    }
}
