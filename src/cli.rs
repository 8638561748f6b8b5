//! CLI helper functions

use crate::{
    client::{Auth, ClientOptions, LookerClient, QueryApi},
    config::{DEFAULT_TABLES, Settings, TableCatalog},
    extract::{ExtractionSummary, TableExtractor},
    storage::OutputDirectory,
};
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::time::Duration;
use url::Url;

/// Load a Looker client from environment variables, logging in if needed
///
/// Expected environment variables:
/// - LOOKERSDK_BASE_URL: Looker API base URL (required)
/// - LOOKERSDK_CLIENT_ID: API3 client id (optional)
/// - LOOKERSDK_CLIENT_SECRET: API3 client secret (optional)
/// - LOOKERSDK_ACCESS_TOKEN: Pre-issued access token (optional, wins over client credentials)
/// - LOOKERSDK_API_VERSION: API version (optional, defaults to 4.0)
/// - LOOKERSDK_VERIFY_SSL: Verify TLS certificates (optional, defaults to true)
/// - LOOKERSDK_TIMEOUT: HTTP timeout in seconds (optional, defaults to 120)
pub async fn load_looker_client() -> Result<LookerClient> {
    let url_str = std::env::var("LOOKERSDK_BASE_URL")
        .context("LOOKERSDK_BASE_URL environment variable not set")?;
    let url = Url::parse(&url_str)
        .with_context(|| format!("Invalid LOOKERSDK_BASE_URL: {}", url_str))?;

    let auth = Auth::new(
        std::env::var("LOOKERSDK_CLIENT_ID").ok(),
        std::env::var("LOOKERSDK_CLIENT_SECRET").ok(),
        std::env::var("LOOKERSDK_ACCESS_TOKEN").ok(),
    );
    log::debug!("Using {} authentication", auth);

    let options = load_client_options()?;
    LookerClient::connect(url, auth, options)
        .await
        .context("Failed to create Looker client")
}

/// Read transport options from the LOOKERSDK_* variables
pub fn load_client_options() -> Result<ClientOptions> {
    let mut options = ClientOptions::default();

    if let Ok(version) = std::env::var("LOOKERSDK_API_VERSION") {
        options.api_version = version;
    }
    if let Ok(verify) = std::env::var("LOOKERSDK_VERIFY_SSL") {
        options.verify_ssl = match verify.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            _ => eyre::bail!("Invalid LOOKERSDK_VERIFY_SSL: {}", verify),
        };
    }
    if let Ok(timeout) = std::env::var("LOOKERSDK_TIMEOUT") {
        let secs: u64 = timeout
            .trim()
            .parse()
            .with_context(|| format!("Invalid LOOKERSDK_TIMEOUT: {}", timeout))?;
        options.timeout = Duration::from_secs(secs);
    }

    Ok(options)
}

/// Tables to run: the requested one, or the built-in list in order
pub fn tables_to_extract(table: Option<&str>) -> Vec<String> {
    match table {
        Some(table) => vec![table.to_string()],
        None => DEFAULT_TABLES.iter().map(|t| t.to_string()).collect(),
    }
}

/// Extract one table into its own directory under the output root
///
/// Pipeline: TableCatalog → TableExtractor (probe, then fetch/dump cycles) → CSV files
pub async fn extract_table<C: QueryApi>(
    client: &C,
    catalog: &TableCatalog,
    settings: &Settings,
    output: &OutputDirectory,
    table: &str,
) -> Result<ExtractionSummary> {
    log::info!("Start extracting {} table", table.bright_white());

    let descriptor = catalog.descriptor(table)?;
    let extractor =
        TableExtractor::try_new(client, &descriptor, settings, output.table_dir(table)).await?;
    extractor.run().await
}

/// Outcome of a whole run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub extracted: Vec<ExtractionSummary>,
    pub failed: Vec<String>,
}

impl RunSummary {
    pub fn total_records(&self) -> usize {
        self.extracted.iter().map(|s| s.total_records).sum()
    }
}

/// Extract tables one after another
///
/// A failing table is logged and skipped; the remaining tables still run.
pub async fn run_extraction<C: QueryApi>(
    client: &C,
    catalog: &TableCatalog,
    settings: &Settings,
    output: &OutputDirectory,
    tables: &[String],
) -> RunSummary {
    let mut summary = RunSummary::default();

    for table in tables {
        match extract_table(client, catalog, settings, output, table).await {
            Ok(extracted) => {
                log::info!(
                    "✓ Extracted {} record(s) from {} table",
                    extracted.total_records,
                    table.bright_white()
                );
                summary.extracted.push(extracted);
            }
            Err(e) => {
                log::error!("Error while extracting {} table: {:#}", table.red(), e);
                summary.failed.push(table.clone());
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOOKER_VARS: &[&str] = &[
        "LOOKERSDK_BASE_URL",
        "LOOKERSDK_CLIENT_ID",
        "LOOKERSDK_CLIENT_SECRET",
        "LOOKERSDK_ACCESS_TOKEN",
        "LOOKERSDK_API_VERSION",
        "LOOKERSDK_VERIFY_SSL",
        "LOOKERSDK_TIMEOUT",
    ];

    fn clear_looker_vars() {
        for var in LOOKER_VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn test_load_looker_client_no_url() {
        clear_looker_vars();

        let result = load_looker_client().await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("LOOKERSDK_BASE_URL")
        );
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn test_load_looker_client_with_token() {
        clear_looker_vars();
        unsafe {
            std::env::set_var("LOOKERSDK_BASE_URL", "https://example.looker.com:19999");
            std::env::set_var("LOOKERSDK_ACCESS_TOKEN", "abc123");
        }

        // A token skips the login round trip
        let client = load_looker_client().await.unwrap();
        assert_eq!(
            client.to_string(),
            "https://example.looker.com:19999/ (API 4.0)"
        );

        clear_looker_vars();
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn test_load_looker_client_invalid_url() {
        clear_looker_vars();
        unsafe {
            std::env::set_var("LOOKERSDK_BASE_URL", "not-a-valid-url");
        }

        let result = load_looker_client().await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid LOOKERSDK_BASE_URL")
        );

        clear_looker_vars();
    }

    #[test]
    #[serial_test::serial]
    fn test_load_client_options() {
        clear_looker_vars();
        unsafe {
            std::env::set_var("LOOKERSDK_API_VERSION", "3.1");
            std::env::set_var("LOOKERSDK_VERIFY_SSL", "False");
            std::env::set_var("LOOKERSDK_TIMEOUT", "30");
        }

        let options = load_client_options().unwrap();
        assert_eq!(options.api_version, "3.1");
        assert!(!options.verify_ssl);
        assert_eq!(options.timeout, Duration::from_secs(30));

        clear_looker_vars();
    }

    #[test]
    #[serial_test::serial]
    fn test_load_client_options_invalid() {
        clear_looker_vars();
        unsafe {
            std::env::set_var("LOOKERSDK_VERIFY_SSL", "maybe");
        }
        assert!(load_client_options().is_err());

        clear_looker_vars();
        unsafe {
            std::env::set_var("LOOKERSDK_TIMEOUT", "soon");
        }
        let err = load_client_options().unwrap_err();
        assert!(err.to_string().contains("Invalid LOOKERSDK_TIMEOUT"));

        clear_looker_vars();
    }

    #[test]
    fn test_tables_to_extract() {
        assert_eq!(tables_to_extract(Some("role")), vec!["role"]);

        let all = tables_to_extract(None);
        assert_eq!(all.len(), 11);
        assert_eq!(all.first().map(String::as_str), Some("user"));
        assert_eq!(all.last().map(String::as_str), Some("query_metrics"));
    }
}
