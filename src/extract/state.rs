//! Per-table extraction state

use super::cursor::{CursorInit, CursorValue};

/// Mutable progress of one table's extraction.
///
/// `row_count` doubles as the mode flag: `Some` while batching, `None` for
/// full extraction or once the last batch has been dumped.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionState {
    pub row_count: Option<i64>,
    pub cursor_field: Option<String>,
    pub is_id_cursor: bool,
    /// Start of the next batch query
    pub cursor_value: Option<CursorValue>,
    pub last_cursor_value: Option<CursorValue>,
    /// Unknown until the first dump, then false, then true for good
    pub is_last_batch: Option<bool>,
    pub file_sequence: i64,
    pub total_records: usize,
}

impl ExtractionState {
    pub fn full() -> Self {
        Self {
            row_count: None,
            cursor_field: None,
            is_id_cursor: false,
            cursor_value: None,
            last_cursor_value: None,
            is_last_batch: None,
            file_sequence: -1,
            total_records: 0,
        }
    }

    pub fn batch(row_count: i64, cursor: &CursorInit) -> Self {
        Self {
            row_count: Some(row_count),
            cursor_field: Some(cursor.field.clone()),
            is_id_cursor: cursor.is_id_cursor(),
            cursor_value: Some(cursor.initial_value.clone()),
            ..Self::full()
        }
    }

    pub fn is_batch_mode(&self) -> bool {
        self.row_count.is_some()
    }

    pub fn is_done(&self) -> bool {
        self.is_last_batch == Some(true)
    }

    /// Move the cursor to the last value of a freshly fetched batch.
    ///
    /// A batch without a usable last value leaves the cursor where it was.
    pub fn advance_cursor(&mut self, next: Option<CursorValue>) {
        self.last_cursor_value = self.cursor_value.clone();
        if let Some(value) = next {
            self.cursor_value = Some(value);
        }
    }

    /// True when the latest advance did not move the cursor
    pub fn cursor_stalled(&self) -> bool {
        self.last_cursor_value == self.cursor_value
    }

    /// Note that more batches follow, unless the end is already known
    pub fn expect_more(&mut self) {
        if !self.is_done() {
            self.is_last_batch = Some(false);
        }
    }

    /// Stop batching for good
    pub fn finish(&mut self) {
        self.is_last_batch = Some(true);
        self.row_count = None;
    }

    pub fn next_file_sequence(&mut self) -> i64 {
        self.file_sequence += 1;
        self.file_sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::cursor::CursorKind;

    fn id_cursor() -> CursorInit {
        CursorInit {
            field: "query.id".to_string(),
            kind: CursorKind::Identity,
            initial_value: CursorValue::Integer(-1),
        }
    }

    #[test]
    fn test_batch_state() {
        let state = ExtractionState::batch(120_000, &id_cursor());
        assert!(state.is_batch_mode());
        assert!(state.is_id_cursor);
        assert_eq!(state.cursor_value, Some(CursorValue::Integer(-1)));
        assert_eq!(state.is_last_batch, None);
        assert_eq!(state.file_sequence, -1);
    }

    #[test]
    fn test_advance_and_stall() {
        let mut state = ExtractionState::batch(10, &id_cursor());

        state.advance_cursor(Some(CursorValue::Integer(500)));
        assert_eq!(state.last_cursor_value, Some(CursorValue::Integer(-1)));
        assert_eq!(state.cursor_value, Some(CursorValue::Integer(500)));
        assert!(!state.cursor_stalled());

        state.advance_cursor(Some(CursorValue::Integer(500)));
        assert!(state.cursor_stalled());

        // No last value keeps the cursor in place
        state.advance_cursor(None);
        assert_eq!(state.cursor_value, Some(CursorValue::Integer(500)));
        assert!(state.cursor_stalled());
    }

    #[test]
    fn test_last_batch_is_monotonic() {
        let mut state = ExtractionState::batch(10, &id_cursor());
        state.expect_more();
        assert_eq!(state.is_last_batch, Some(false));

        state.finish();
        assert!(state.is_done());
        assert!(!state.is_batch_mode());

        state.expect_more();
        assert_eq!(state.is_last_batch, Some(true));
    }

    #[test]
    fn test_file_sequence() {
        let mut state = ExtractionState::full();
        assert_eq!(state.next_file_sequence(), 0);
        assert_eq!(state.next_file_sequence(), 1);
    }
}
