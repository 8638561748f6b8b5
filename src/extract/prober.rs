//! Row-count probing
//!
//! Decides the extraction mode of a table: tables with a count measure are
//! counted and extracted in cursor batches, the rest in one full pull.

use super::{BatchExecutor, ExtractError, Frame, query::count_query};
use crate::client::QueryApi;
use crate::config::TableDescriptor;
use eyre::Result;
use owo_colors::OwoColorize;

/// Count the rows of a table's view.
///
/// Returns `None` when the table has no count measure, which selects full
/// extraction. Not every system activity explore exposes one.
pub async fn probe_row_count<C: QueryApi>(
    executor: &BatchExecutor<'_, C>,
    descriptor: &TableDescriptor,
) -> Result<Option<i64>> {
    let Some(count_measure) = &descriptor.count_measure else {
        log::debug!(
            "No count measure for {}, using full extraction",
            descriptor.table
        );
        return Ok(None);
    };

    log::info!(
        "Fetching rowcount for {}",
        format!("{}.{}", descriptor.model, descriptor.view).cyan()
    );
    let raw = executor
        .execute(&count_query(descriptor, count_measure))
        .await?;
    let row_count = parse_row_count(&raw)?;
    log::info!("Row count of {} is {}", descriptor.view, row_count);

    Ok(Some(row_count))
}

/// Read the single scalar of a count query result
fn parse_row_count(raw: &str) -> Result<i64> {
    let frame = Frame::from_csv(raw)?;
    let cell = frame
        .rows()
        .first()
        .and_then(|row| row.first())
        .ok_or_else(|| ExtractError::UnexpectedResult("empty row count result".to_string()))?;

    let count = cell.trim().parse::<i64>().map_err(|_| {
        ExtractError::UnexpectedResult(format!("row count '{}' is not an integer", cell))
    })?;
    Ok(count)
}
