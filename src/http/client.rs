//! HTTP client wrapper with token authentication and request tracking

use crate::error::{ExportError, Result};
use crate::models::ExportConfig;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Query parameters for a single request
pub type Query<'a> = [(&'a str, String)];

/// HTTP client for the SonarQube web API
#[derive(Clone)]
pub struct SonarClient {
    client: Client,
    base_url: String,
    token: String,
    request_count: Arc<AtomicU64>,
}

impl SonarClient {
    /// Creates a new SonarClient from export configuration
    pub fn from_config(config: &ExportConfig) -> Result<Self> {
        if config.host.trim().is_empty() {
            return Err(ExportError::ConfigError("host must not be empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: config.host.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            request_count: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Sends a GET request and decodes the JSON body, failing on any non-2xx status
    pub async fn get_json(&self, path: &str, query: &Query<'_>) -> Result<Value> {
        let response = self.send(path, query).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::ApiError {
                endpoint: describe_request(path, query),
                status: status.as_u16(),
            });
        }
        Ok(response.json::<Value>().await?)
    }

    /// Like `get_json`, but maps HTTP 404 to `None`
    pub async fn get_json_optional(&self, path: &str, query: &Query<'_>) -> Result<Option<Value>> {
        let response = self.send(path, query).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ExportError::ApiError {
                endpoint: describe_request(path, query),
                status: status.as_u16(),
            });
        }
        Ok(Some(response.json::<Value>().await?))
    }

    /// Returns the total number of requests made
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Single attempt, no retries
    async fn send(&self, path: &str, query: &Query<'_>) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        self.request_count.fetch_add(1, Ordering::Relaxed);
        debug!("GET {}", describe_request(path, query));

        let response = self
            .client
            .get(&url)
            .query(query)
            .basic_auth(&self.token, Some(""))
            .send()
            .await?;

        debug!("Response: {} for {}", response.status(), response.url());
        Ok(response)
    }
}

/// Renders a request as `path?k=v&...` for logs and error messages
pub fn describe_request(path: &str, query: &Query<'_>) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let params: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{path}?{}", params.join("&"))
}
