//! Async HTTP client for the Dataverse Web API.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::{ClientError, ClientResult};
use super::protocol::{API_BASE_PATH, DEFAULT_TIMEOUT_SECS};
use crate::config::Settings;

/// Read-only client for the metadata endpoints.
///
/// Every request is bounded by a fixed timeout and every failure is mapped
/// onto [`ClientError`], whose `Display` output is the message shown to the
/// user.
///
/// # Example
///
/// ```ignore
/// use schemascope::client::{MetadataClient, protocol::{paths, ODataCollection, RawEntity}};
///
/// let client = MetadataClient::new("https://contoso.crm.dynamics.com")?;
/// let entities: ODataCollection<RawEntity> = client.get_json(&paths::list_entities()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct MetadataClient {
    http: reqwest::Client,
    /// Organization URL plus API base path, without trailing slash.
    api_root: String,
    /// Organization URL, used for deep links.
    org_url: String,
    timeout: Duration,
}

impl MetadataClient {
    /// Create a client with the default API path and timeout.
    pub fn new(org_url: impl Into<String>) -> ClientResult<Self> {
        Self::builder(org_url).build()
    }

    /// Start building a client for the given organization URL.
    pub fn builder(org_url: impl Into<String>) -> MetadataClientBuilder {
        MetadataClientBuilder {
            org_url: org_url.into(),
            api_path: API_BASE_PATH.to_string(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create a client from resolved settings.
    pub fn from_settings(settings: &Settings) -> ClientResult<Self> {
        let connection = &settings.connection;
        let url = connection
            .resolved_url()
            .map_err(|e| ClientError::Other(e.to_string()))?;
        let token = connection
            .resolved_token()
            .map_err(|e| ClientError::Other(e.to_string()))?;

        let mut builder = Self::builder(url)
            .api_path(connection.api_path.clone())
            .timeout(Duration::from_secs(connection.timeout_seconds));
        if let Some(token) = token {
            builder = builder.bearer_token(token);
        }
        builder.build()
    }

    /// Issue a GET for a path relative to the API root and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The service cannot be reached
    /// - The request exceeds the timeout
    /// - The service answers with a non-success status
    /// - The body is not the expected JSON shape
    pub async fn get_json<R>(&self, path: &str) -> ClientResult<R>
    where
        R: DeserializeOwned,
    {
        let url = self.url_for(path);
        debug!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if let Some(err) = ClientError::from_status(status) {
            debug!(%url, status = status.as_u16(), "request failed");
            return Err(err);
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Absolute URL for a path relative to the API root.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.api_root, path.trim_start_matches('/'))
    }

    /// The organization URL the client talks to.
    pub fn org_url(&self) -> &str {
        &self.org_url
    }

    /// Get the current request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Builder for [`MetadataClient`].
#[derive(Debug, Clone)]
pub struct MetadataClientBuilder {
    org_url: String,
    api_path: String,
    token: Option<String>,
    timeout: Duration,
}

impl MetadataClientBuilder {
    /// Override the API base path (default `/api/data/v9.2`).
    pub fn api_path(mut self, api_path: impl Into<String>) -> Self {
        self.api_path = api_path.into();
        self
    }

    /// Forward a bearer token obtained by the host environment.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Override the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client.
    pub fn build(self) -> ClientResult<MetadataClient> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("odata-maxversion", HeaderValue::from_static("4.0"));
        headers.insert("odata-version", HeaderValue::from_static("4.0"));
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ClientError::Other("Invalid bearer token".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Other(e.to_string()))?;

        let org_url = self.org_url.trim_end_matches('/').to_string();
        let api_path = self.api_path.trim_matches('/');
        let api_root = if api_path.is_empty() {
            org_url.clone()
        } else {
            format!("{org_url}/{api_path}")
        };

        Ok(MetadataClient {
            http,
            api_root,
            org_url,
            timeout: self.timeout,
        })
    }
}
