//! HTTP access to the otakudesu site
//!
//! [`Transport`] is the seam between the scraping logic and the network:
//! the pipeline and the resolver only ever see paths, HTML strings and
//! JSON values. [`HttpTransport`] is the `reqwest` implementation.

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Default otakudesu base URL (the domain moves regularly, see config)
pub const DEFAULT_BASE_URL: &str = "https://otakudesu.cloud";

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent, a desktop browser; the site rejects obvious bots
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Page fetch and form post against the upstream site
///
/// Both calls fail with [`Error::Status`] on a non-2xx answer.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GETs `path` (relative to the base URL) and returns the body
    async fn fetch_page(&self, path: &str) -> Result<String>;

    /// POSTs `fields` url-encoded to `path` and returns the JSON body
    async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> Result<serde_json::Value>;

    /// Absolute URL of a site path, used to build `otakudesuUrl` fields
    fn base_url(&self) -> &str;
}

/// `reqwest` implementation of [`Transport`]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> TransportBuilder {
        TransportBuilder::default()
    }

    /// Get the internal HTTP client
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    /// Joins `path` to the base URL
    ///
    /// Paths may start with `/` or with `?` (search queries hit the root).
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    fn check_status(response: &reqwest::Response, url: &str) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            })
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_page(&self, path: &str) -> Result<String> {
        let url = self.url_for(path);
        tracing::debug!("Fetching page: {}", url);

        let response = self.client.get(&url).timeout(self.timeout).send().await?;
        Self::check_status(&response, &url)?;

        Ok(response.text().await?)
    }

    async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> Result<serde_json::Value> {
        let url = self.url_for(path);
        tracing::debug!("Posting form to {} ({} fields)", url, fields.len());

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .form(fields)
            .send()
            .await?;
        Self::check_status(&response, &url)?;

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Builder for configuring an [`HttpTransport`]
#[derive(Debug)]
pub struct TransportBuilder {
    client: Option<Client>,
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl Default for TransportBuilder {
    fn default() -> Self {
        Self {
            client: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl TransportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client (shared pool, proxy...)
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<HttpTransport> {
        // Reject garbage early rather than on the first request
        url::Url::parse(&self.base_url)?;

        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(&self.user_agent)
                .timeout(self.timeout)
                .build()?,
        };

        Ok(HttpTransport {
            client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            timeout: self.timeout,
        })
    }
}
