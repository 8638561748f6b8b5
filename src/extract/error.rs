//! Error taxonomy for table extraction
//!
//! These errors are raised inside the engine and travel as [`eyre::Report`]s.
//! Callers that need to branch on the kind can `downcast_ref::<ExtractError>()`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// A descriptor or override is unusable for this table
    #[error("Configuration error for table '{table}': {message}")]
    Configuration { table: String, message: String },

    /// The table has no entry in the schema file
    #[error("Table {table} is not found in {file} file.")]
    TableNotFound { table: String, file: String },

    /// The remote API accepted the request but returned no query id
    #[error("Failed to create query for view [{view}]")]
    QueryCreation { view: String },

    /// The remote API returned no task id for an async query run
    #[error("Failed to create query task for query id [{query_id}]")]
    TaskCreation { query_id: String },

    /// The async task finished in a failure or error state
    #[error("Query failed. Response: {response}")]
    QueryExecution { task_id: String, response: String },

    /// The poll loop waited past the configured timeout
    #[error("Waited for [{elapsed_secs}] seconds, which exceeded timeout")]
    QueryTimeout { task_id: String, elapsed_secs: u64 },

    /// A result could not be interpreted (e.g. a non-numeric row count)
    #[error("Unexpected query result: {0}")]
    UnexpectedResult(String),
}

impl ExtractError {
    pub fn configuration(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            table: table.into(),
            message: message.into(),
        }
    }
}
