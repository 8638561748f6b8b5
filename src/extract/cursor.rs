//! Cursor selection, typing and initial values
//!
//! A batch extraction orders and bounds every query on one cursor field.
//! Identity cursors (`id` or `<view>.id`) are integers compared with an
//! inclusive `>=`; every other cursor is temporal and compared with `after`.

use super::ExtractError;
use crate::config::{PrimaryKey, TableDescriptor};
use chrono::{Days, NaiveDate};
use eyre::Result;

pub const ID_CURSOR_FIELD: &str = "id";
/// Start of every identity cursor without an override
pub const START_ID: i64 = -1;

/// A cursor position, typed once at classification time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorValue {
    Integer(i64),
    Text(String),
}

impl std::fmt::Display for CursorValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorKind {
    Identity,
    Temporal,
}

impl CursorKind {
    pub fn classify(field: &str) -> Self {
        if field == ID_CURSOR_FIELD || cursor_column(field) == ID_CURSOR_FIELD {
            Self::Identity
        } else {
            Self::Temporal
        }
    }

    /// Looker filter expression selecting rows from `value` onwards
    pub fn filter_expression(&self, value: &CursorValue) -> String {
        match self {
            Self::Identity => format!(">= {}", value),
            Self::Temporal => format!("after {}", value),
        }
    }

    /// Type a raw result cell. Empty cells carry no position.
    pub fn parse(&self, raw: &str) -> Result<Option<CursorValue>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        match self {
            Self::Identity => raw
                .parse::<i64>()
                .map(|n| Some(CursorValue::Integer(n)))
                .map_err(|_| {
                    eyre::Report::from(ExtractError::UnexpectedResult(format!(
                        "non-integer id cursor value '{}'",
                        raw
                    )))
                }),
            Self::Temporal => Ok(Some(CursorValue::Text(raw.to_string()))),
        }
    }
}

/// Name of the cursor column once results carry schema names
pub fn cursor_column(field: &str) -> &str {
    field.rsplit('.').next().unwrap_or(field)
}

/// Effective cursor field: explicit cursor field, else a scalar primary key,
/// else the batch cursor field of a composite key.
pub fn resolve_cursor_field(descriptor: &TableDescriptor) -> Option<&str> {
    if let Some(field) = &descriptor.cursor_field {
        return Some(field.as_str());
    }
    match &descriptor.primary_key {
        Some(PrimaryKey::Single(key)) => Some(key.as_str()),
        Some(PrimaryKey::Composite(_)) => descriptor.batch_cursor_field.as_deref(),
        None => None,
    }
}

/// Cursor chosen for a batch extraction
#[derive(Debug, Clone, PartialEq)]
pub struct CursorInit {
    pub field: String,
    pub kind: CursorKind,
    pub initial_value: CursorValue,
}

impl CursorInit {
    /// Pick the cursor field and its start value.
    ///
    /// Start precedence: days-ago override, then manual override, then
    /// [`START_ID`] for identity cursors or `default_timestamp` otherwise.
    ///
    /// # Errors
    /// [`ExtractError::Configuration`] when no cursor field resolves or an
    /// override cannot be applied to the cursor type.
    pub fn resolve(
        descriptor: &TableDescriptor,
        default_timestamp: &str,
        today: NaiveDate,
    ) -> Result<Self> {
        let table = &descriptor.table;
        let field = resolve_cursor_field(descriptor).ok_or_else(|| {
            ExtractError::configuration(
                table,
                "count measure is set but no cursor_field, primary_key or batch_cursor_field resolves",
            )
        })?;
        let kind = CursorKind::classify(field);
        let overrides = &descriptor.cursor_overrides;

        let initial_value = if let Some(days) = overrides.days_ago {
            let start = today
                .checked_sub_days(Days::new(days.unsigned_abs()))
                .ok_or_else(|| {
                    ExtractError::configuration(table, format!("days ago {} out of range", days))
                })?;
            CursorValue::Text(start.format("%Y-%m-%d 00:00:00").to_string())
        } else if let Some(manual) = &overrides.manual_initial_value {
            match kind {
                CursorKind::Identity => manual
                    .trim()
                    .parse::<i64>()
                    .map(CursorValue::Integer)
                    .map_err(|_| {
                        ExtractError::configuration(
                            table,
                            format!("manual initial value '{}' is not an integer id", manual),
                        )
                    })?,
                CursorKind::Temporal => CursorValue::Text(manual.clone()),
            }
        } else {
            match kind {
                CursorKind::Identity => CursorValue::Integer(START_ID),
                CursorKind::Temporal => CursorValue::Text(default_timestamp.to_string()),
            }
        };

        Ok(Self {
            field: field.to_string(),
            kind,
            initial_value,
        })
    }

    pub fn is_id_cursor(&self) -> bool {
        self.kind == CursorKind::Identity
    }

    pub fn column(&self) -> &str {
        cursor_column(&self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CursorOverrides;

    const DEFAULT_TS: &str = "2015-01-01 00:00:00";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn descriptor(primary_key: Option<PrimaryKey>) -> TableDescriptor {
        let mut descriptor = TableDescriptor::new(
            "history",
            "system__activity",
            "history",
            vec!["history.id".to_string()],
            vec!["id".to_string()],
        );
        descriptor.count_measure = Some("history.count".to_string());
        descriptor.primary_key = primary_key;
        descriptor
    }

    #[test]
    fn test_classify() {
        assert_eq!(CursorKind::classify("id"), CursorKind::Identity);
        assert_eq!(CursorKind::classify("query.id"), CursorKind::Identity);
        assert_eq!(CursorKind::classify("query.user_id"), CursorKind::Temporal);
        assert_eq!(
            CursorKind::classify("history.created_time"),
            CursorKind::Temporal
        );
        assert_eq!(CursorKind::classify("identity"), CursorKind::Temporal);
    }

    #[test]
    fn test_filter_expressions() {
        assert_eq!(
            CursorKind::Identity.filter_expression(&CursorValue::Integer(-1)),
            ">= -1"
        );
        assert_eq!(
            CursorKind::Temporal.filter_expression(&CursorValue::Text(DEFAULT_TS.to_string())),
            "after 2015-01-01 00:00:00"
        );
    }

    #[test]
    fn test_parse_cells() {
        assert_eq!(
            CursorKind::Identity.parse(" 42 ").unwrap(),
            Some(CursorValue::Integer(42))
        );
        assert_eq!(CursorKind::Identity.parse("").unwrap(), None);
        assert!(CursorKind::Identity.parse("abc").is_err());
        assert_eq!(
            CursorKind::Temporal.parse("2024-01-01 10:00:00").unwrap(),
            Some(CursorValue::Text("2024-01-01 10:00:00".to_string()))
        );
    }

    #[test]
    fn test_field_resolution_order() {
        let mut d = descriptor(Some(PrimaryKey::Single("history.id".to_string())));
        assert_eq!(resolve_cursor_field(&d), Some("history.id"));

        d.cursor_field = Some("history.created_time".to_string());
        assert_eq!(resolve_cursor_field(&d), Some("history.created_time"));

        let mut d = descriptor(Some(PrimaryKey::Composite(vec![
            "group_user.group_id".to_string(),
            "group_user.user_id".to_string(),
        ])));
        assert_eq!(resolve_cursor_field(&d), None);
        d.batch_cursor_field = Some("group_user.created_time".to_string());
        assert_eq!(resolve_cursor_field(&d), Some("group_user.created_time"));
    }

    #[test]
    fn test_defaults_by_kind() {
        let d = descriptor(Some(PrimaryKey::Single("history.id".to_string())));
        let cursor = CursorInit::resolve(&d, DEFAULT_TS, today()).unwrap();
        assert!(cursor.is_id_cursor());
        assert_eq!(cursor.column(), "id");
        assert_eq!(cursor.initial_value, CursorValue::Integer(START_ID));

        let mut d = d;
        d.cursor_field = Some("history.created_time".to_string());
        let cursor = CursorInit::resolve(&d, DEFAULT_TS, today()).unwrap();
        assert!(!cursor.is_id_cursor());
        assert_eq!(
            cursor.initial_value,
            CursorValue::Text(DEFAULT_TS.to_string())
        );
    }

    #[test]
    fn test_days_ago_wins_over_manual() {
        let mut d = descriptor(Some(PrimaryKey::Single("history.id".to_string())));
        d.cursor_field = Some("history.created_time".to_string());
        d.cursor_overrides = CursorOverrides {
            days_ago: Some(10),
            manual_initial_value: Some("2020-01-01 00:00:00".to_string()),
        };

        let cursor = CursorInit::resolve(&d, DEFAULT_TS, today()).unwrap();
        assert_eq!(
            cursor.initial_value,
            CursorValue::Text("2024-03-05 00:00:00".to_string())
        );

        // Negative values count backwards too
        d.cursor_overrides.days_ago = Some(-10);
        let cursor = CursorInit::resolve(&d, DEFAULT_TS, today()).unwrap();
        assert_eq!(
            cursor.initial_value,
            CursorValue::Text("2024-03-05 00:00:00".to_string())
        );
    }

    #[test]
    fn test_manual_override() {
        let mut d = descriptor(Some(PrimaryKey::Single("history.id".to_string())));
        d.cursor_overrides.manual_initial_value = Some("1500".to_string());
        let cursor = CursorInit::resolve(&d, DEFAULT_TS, today()).unwrap();
        assert_eq!(cursor.initial_value, CursorValue::Integer(1500));

        d.cursor_overrides.manual_initial_value = Some("yesterday".to_string());
        let err = CursorInit::resolve(&d, DEFAULT_TS, today()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExtractError>(),
            Some(ExtractError::Configuration { .. })
        ));

        d.cursor_field = Some("history.created_time".to_string());
        let cursor = CursorInit::resolve(&d, DEFAULT_TS, today()).unwrap();
        assert_eq!(cursor.initial_value, CursorValue::Text("yesterday".to_string()));
    }

    #[test]
    fn test_no_cursor_field() {
        let d = descriptor(None);
        let err = CursorInit::resolve(&d, DEFAULT_TS, today()).unwrap_err();
        assert!(err.to_string().contains("no cursor_field"));
    }
}
