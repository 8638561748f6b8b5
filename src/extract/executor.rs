//! Async query execution
//!
//! Runs one query end to end: create the query, start an async task, poll
//! until the task completes, fails or times out, then fetch the CSV body.
//! Nothing is retried here; every failure goes back to the caller.

use super::ExtractError;
use crate::client::{QueryApi, QuerySpec, ResultFormat, TaskStatus};
use crate::config::Settings;
use eyre::Result;
use std::time::Duration;

pub struct BatchExecutor<'a, C> {
    client: &'a C,
    poll_interval: Duration,
    timeout: Duration,
}

impl<'a, C: QueryApi> BatchExecutor<'a, C> {
    pub fn new(client: &'a C, settings: &Settings) -> Self {
        Self {
            client,
            poll_interval: settings.poll_interval,
            timeout: settings.query_timeout,
        }
    }

    /// Create the query and return its id
    pub async fn submit(&self, spec: &QuerySpec) -> Result<String> {
        let query = self.client.create_query(spec).await?;
        let query_id = query.id.ok_or_else(|| ExtractError::QueryCreation {
            view: spec.view.clone(),
        })?;

        log::info!(
            "Successfully created query, query_id is [{}] query url: {}",
            query_id,
            query.share_url.as_deref().unwrap_or("-")
        );
        Ok(query_id)
    }

    /// Run an existing query as an async task and return the raw CSV result
    pub async fn run(&self, query_id: &str) -> Result<String> {
        log::debug!("Creating async query");
        let task = self
            .client
            .create_query_task(query_id, ResultFormat::Csv)
            .await?;
        let task_id = task.id.ok_or_else(|| ExtractError::TaskCreation {
            query_id: query_id.to_string(),
        })?;
        log::info!(
            "Created async query task id [{}] for query id [{}]",
            task_id,
            query_id
        );

        let mut elapsed = Duration::ZERO;
        let poll = loop {
            let poll = self.client.query_task(&task_id).await?;
            match poll.status {
                TaskStatus::Failure | TaskStatus::Error => {
                    return Err(ExtractError::QueryExecution {
                        task_id,
                        response: format!("{:?}", poll),
                    }
                    .into());
                }
                TaskStatus::Complete => break poll,
                _ => {}
            }

            tokio::time::sleep(self.poll_interval).await;
            elapsed += self.poll_interval;

            if elapsed >= self.timeout {
                return Err(ExtractError::QueryTimeout {
                    task_id,
                    elapsed_secs: elapsed.as_secs(),
                }
                .into());
            }
        };

        log::info!(
            "Query task completed in {:.2} seconds",
            poll.runtime.unwrap_or_default()
        );
        log::debug!("Waited {} seconds", elapsed.as_secs_f64());

        self.client.query_task_results(&task_id).await
    }

    /// Submit and run a query
    pub async fn execute(&self, spec: &QuerySpec) -> Result<String> {
        let query_id = self.submit(spec).await?;
        self.run(&query_id).await
    }
}
