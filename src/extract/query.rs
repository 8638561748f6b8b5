//! Query construction

use super::ExtractionState;
use super::cursor::CursorKind;
use crate::client::QuerySpec;
use crate::config::{Settings, TableDescriptor};

/// Query selecting only the count measure of a view
pub fn count_query(descriptor: &TableDescriptor, count_measure: &str) -> QuerySpec {
    QuerySpec {
        model: descriptor.model.clone(),
        view: descriptor.view.clone(),
        fields: vec![count_measure.to_string()],
        ..Default::default()
    }
}

/// Query for the next page of a table.
///
/// Full mode selects the fields with only a limit and timezone. Batch mode
/// adds a sort on the cursor field and a filter starting at the current
/// cursor value; static filters are merged in without replacing the cursor
/// filter.
pub fn build_query(
    descriptor: &TableDescriptor,
    settings: &Settings,
    state: &ExtractionState,
) -> QuerySpec {
    let mut spec = QuerySpec {
        model: descriptor.model.clone(),
        view: descriptor.view.clone(),
        fields: descriptor.fields.clone(),
        limit: Some(settings.row_limit.to_string()),
        query_timezone: Some(settings.query_timezone.clone()),
        ..Default::default()
    };

    if !state.is_batch_mode() {
        return spec;
    }

    if let (Some(field), Some(value)) = (&state.cursor_field, &state.cursor_value) {
        let kind = if state.is_id_cursor {
            CursorKind::Identity
        } else {
            CursorKind::Temporal
        };
        spec.sorts = vec![field.clone()];
        spec.filters
            .insert(field.clone(), kind.filter_expression(value));
    }

    for (field, expression) in &descriptor.filters {
        spec.filters
            .entry(field.clone())
            .or_insert_with(|| expression.clone());
    }

    spec
}
