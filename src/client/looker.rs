//! Looker client module
//!
//! Provides `LookerClient` for making API requests to Looker and implements
//! [`QueryApi`] over the REST endpoints used for query extraction.

use super::Auth;
use super::api::{CreatedQuery, CreatedTask, QueryApi, QuerySpec, ResultFormat, TaskPoll};
use eyre::{Context, Result, eyre};
use reqwest::{Client, ClientBuilder, Method};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_VERSION: &str = "4.0";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// Transport options, mirroring the settings honored by the Looker SDKs.
#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub api_version: String,
    pub verify_ssl: bool,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            verify_ssl: true,
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

#[derive(Deserialize)]
struct AccessToken {
    access_token: String,
}

/// Looker client for making API requests.
///
/// # Example
/// ```no_run
/// use looker_activity_extractor::client::{Auth, ClientOptions, LookerClient};
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let url = Url::parse("https://example.looker.com:19999")?;
/// let auth = Auth::ClientCredentials("id".into(), "secret".into());
/// let client = LookerClient::connect(url, auth, ClientOptions::default()).await?;
/// println!("connected to {}", client);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LookerClient {
    client: Client,
    url: Url,
    api_version: String,
}

impl LookerClient {
    /// Create a client, logging in first when client credentials are given.
    ///
    /// # Errors
    /// Returns an error if the login request fails or the HTTP client cannot be built
    pub async fn connect(url: Url, auth: Auth, options: ClientOptions) -> Result<Self> {
        let url = with_trailing_slash(url);
        let token = match auth {
            Auth::Token(token) => Some(token),
            Auth::ClientCredentials(client_id, client_secret) => {
                Some(Self::login(&url, &client_id, &client_secret, &options).await?)
            }
            Auth::None => None,
        };
        Self::try_new(url, token, options)
    }

    /// Create a client from an optional, already issued access token.
    pub fn try_new(url: Url, token: Option<String>, options: ClientOptions) -> Result<Self> {
        let url = with_trailing_slash(url);
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = token {
            headers.insert(
                reqwest::header::AUTHORIZATION,
                format!("token {}", token).parse()?,
            );
        }
        let client = Self::builder(&options).default_headers(headers).build()?;

        Ok(Self {
            client,
            url,
            api_version: options.api_version,
        })
    }

    fn builder(options: &ClientOptions) -> ClientBuilder {
        Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(!options.verify_ssl)
    }

    async fn login(
        url: &Url,
        client_id: &str,
        client_secret: &str,
        options: &ClientOptions,
    ) -> Result<String> {
        let client = Self::builder(options).build()?;
        let endpoint = url.join(&format!("api/{}/login", options.api_version))?;
        log::debug!("Logging in to {}", endpoint);

        let response = client
            .post(endpoint)
            .form(&[("client_id", client_id), ("client_secret", client_secret)])
            .send()
            .await
            .with_context(|| "Failed to send login request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            eyre::bail!("Looker login failed ({}): {}", status, body);
        }

        let token: AccessToken = response
            .json()
            .await
            .with_context(|| "Failed to parse login response")?;
        Ok(token.access_token)
    }

    /// Resolve an API path like `queries` to a full versioned endpoint.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let path = path.strip_prefix('/').unwrap_or(path);
        Ok(self
            .url
            .join(&format!("api/{}/{}", self.api_version, path))?)
    }

    /// Send a request and fail on non-success statuses.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let endpoint = self.endpoint(path)?;
        log::trace!("{} {}", method, endpoint);

        let request = self.client.request(method, endpoint);
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };
        let response = request
            .send()
            .await
            .map_err(|e| eyre!("Failed to send request: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            eyre::bail!("Request to '{}' failed ({}): {}", path, status, body);
        }
        Ok(response)
    }
}

impl QueryApi for LookerClient {
    async fn create_query(&self, spec: &QuerySpec) -> Result<CreatedQuery> {
        let body = serde_json::to_value(spec)?;
        self.request(Method::POST, "queries", Some(&body))
            .await
            .with_context(|| format!("Failed to create query for view [{}]", spec.view))?
            .json()
            .await
            .with_context(|| "Failed to parse create_query response")
    }

    async fn create_query_task(&self, query_id: &str, format: ResultFormat) -> Result<CreatedTask> {
        let body = serde_json::json!({
            "query_id": query_id,
            "result_format": format,
        });
        self.request(Method::POST, "query_tasks", Some(&body))
            .await
            .with_context(|| format!("Failed to create query task for query id [{}]", query_id))?
            .json()
            .await
            .with_context(|| "Failed to parse create_query_task response")
    }

    async fn query_task(&self, task_id: &str) -> Result<TaskPoll> {
        self.request(Method::GET, &format!("query_tasks/{}", task_id), None)
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse status of query task [{}]", task_id))
    }

    async fn query_task_results(&self, task_id: &str) -> Result<String> {
        self.request(Method::GET, &format!("query_tasks/{}/results", task_id), None)
            .await?
            .text()
            .await
            .with_context(|| format!("Failed to read results of query task [{}]", task_id))
    }
}

// Keep any path prefix on the base url when joining endpoints
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

impl std::fmt::Display for LookerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (API {})", self.url, self.api_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_resolution() {
        let url = Url::parse("https://example.looker.com:19999").unwrap();
        let client = LookerClient::try_new(url, None, ClientOptions::default()).unwrap();

        assert_eq!(
            client.endpoint("queries").unwrap().as_str(),
            "https://example.looker.com:19999/api/4.0/queries"
        );
        assert_eq!(
            client.endpoint("/query_tasks/abc/results").unwrap().as_str(),
            "https://example.looker.com:19999/api/4.0/query_tasks/abc/results"
        );
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let url = Url::parse("https://proxy.internal/looker").unwrap();
        let options = ClientOptions {
            api_version: "4.0".to_string(),
            ..Default::default()
        };
        let client = LookerClient::try_new(url, Some("tok".to_string()), options).unwrap();

        assert_eq!(client.to_string(), "https://proxy.internal/looker/ (API 4.0)");
        assert_eq!(
            client.endpoint("query_tasks/7").unwrap().as_str(),
            "https://proxy.internal/looker/api/4.0/query_tasks/7"
        );
    }

    #[test]
    fn test_display() {
        let url = Url::parse("https://example.looker.com").unwrap();
        let client = LookerClient::try_new(url, None, ClientOptions::default()).unwrap();
        assert_eq!(client.to_string(), "https://example.looker.com/ (API 4.0)");
    }
}
