//! Runtime settings
//!
//! Built once at startup from the environment (after the dotenv file is
//! sourced) and passed by reference to every component.

use eyre::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_OUTPUT_DIR: &str = "out";
pub const DEFAULT_CURSOR_INITIAL_VALUE: &str = "2015-01-01 00:00:00";
pub const ROW_LIMIT: usize = 50_000;
pub const QUERY_TIMEZONE: &str = "UTC";
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(600);

/// Explores extracted when no single table is requested, in run order.
pub const DEFAULT_TABLES: &[&str] = &[
    "user",
    "user_facts",
    "user_facts_role",
    "role",
    "group_user",
    "group",
    "dashboard",
    "look",
    "history",
    "query",
    "query_metrics",
];

#[derive(Clone, Debug)]
pub struct Settings {
    /// Root of the CSV output tree
    pub output_dir: PathBuf,
    /// Default start value for temporal cursors
    pub cursor_initial_value: String,
    /// Page size of every query
    pub row_limit: usize,
    pub query_timezone: String,
    pub poll_interval: Duration,
    pub query_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            cursor_initial_value: DEFAULT_CURSOR_INITIAL_VALUE.to_string(),
            row_limit: ROW_LIMIT,
            query_timezone: QUERY_TIMEZONE.to_string(),
            poll_interval: POLL_INTERVAL,
            query_timeout: QUERY_TIMEOUT,
        }
    }
}

impl Settings {
    /// Load settings from environment variables
    ///
    /// Recognized variables:
    /// - CSV_DUMP_DIR: output root (default `out`)
    /// - CURSOR_INITIAL_VALUE: temporal cursor default (default `2015-01-01 00:00:00`)
    /// - QUERY_TIMEOUT: seconds to wait for a query task (default 600)
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();

        if let Ok(dir) = std::env::var("CSV_DUMP_DIR") {
            settings.output_dir = PathBuf::from(dir);
        }
        if let Ok(value) = std::env::var("CURSOR_INITIAL_VALUE") {
            settings.cursor_initial_value = value;
        }
        if let Ok(timeout) = std::env::var("QUERY_TIMEOUT") {
            let secs: u64 = timeout
                .trim()
                .parse()
                .with_context(|| format!("Invalid QUERY_TIMEOUT: {}", timeout))?;
            settings.query_timeout = Duration::from_secs(secs);
        }

        Ok(settings)
    }
}
