//! Remote query API contract
//!
//! The extraction engine only talks to Looker through [`QueryApi`]. The HTTP
//! implementation lives in [`super::LookerClient`]; tests substitute their own.

use eyre::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::future::Future;

/// Body of a Looker `create_query` call (the API's `WriteQuery`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuerySpec {
    pub model: String,
    pub view: String,
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sorts: Vec<String>,
    /// Looker expects the limit as a string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_timezone: Option<String>,
}

/// Response of `create_query`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedQuery {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub share_url: Option<String>,
}

/// Response of `create_query_task`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedTask {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
}

/// Result formats understood by `create_query_task`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFormat {
    Csv,
}

impl std::fmt::Display for ResultFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Status reported by `query_task`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Added,
    Pending,
    Running,
    Complete,
    Failure,
    Error,
    #[serde(other)]
    Unknown,
}

/// Response of `query_task`
#[derive(Debug, Clone, Deserialize)]
pub struct TaskPoll {
    pub status: TaskStatus,
    /// Server-side runtime in seconds
    #[serde(default)]
    pub runtime: Option<f64>,
}

/// The four remote operations the engine depends on.
pub trait QueryApi: Send + Sync {
    /// Create a query and return its id and share url
    fn create_query(&self, spec: &QuerySpec)
    -> impl Future<Output = Result<CreatedQuery>> + Send;

    /// Start an async run of an existing query
    fn create_query_task(
        &self,
        query_id: &str,
        format: ResultFormat,
    ) -> impl Future<Output = Result<CreatedTask>> + Send;

    /// Poll the status of an async run
    fn query_task(&self, task_id: &str) -> impl Future<Output = Result<TaskPoll>> + Send;

    /// Fetch the raw result body of a completed run
    fn query_task_results(&self, task_id: &str) -> impl Future<Output = Result<String>> + Send;
}

// Looker ids are strings in API 4.0 but numbers in older payloads.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
