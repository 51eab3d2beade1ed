//! HTTP retrieval
//!
//! Design decisions:
//! 1. One trait, one method: `get(address)` hands back the resolved URL and a body stream
//! 2. Blocking. The caller's thread waits; there is no cancellation
//! 3. Fail fast - no retries. Let the caller decide.
//! 4. HTTP status codes are not errors; an error page is still a document

use crate::error::{QueryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::time::Duration;
use url::Url;

/// A fetched resource, body not yet read
pub struct HttpResponse {
    /// Final location after redirects
    pub url: Url,
    pub body: Box<dyn Read + Send>,
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

/// Retrieves documents by address
pub trait HttpClient {
    fn get(&self, address: &str) -> Result<HttpResponse>;
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub user_agent: String,
    /// Whole-request timeout. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: None,
            max_redirects: 10,
        }
    }
}

/// `HttpClient` backed by `reqwest::blocking`
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Create client with default config
    pub fn new() -> Result<Self> {
        Self::with_config(&FetchConfig::default())
    }

    /// Create client with custom config
    pub fn with_config(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout_secs.map(Duration::from_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| QueryError::ClientSetup(e.into()))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, address: &str) -> Result<HttpResponse> {
        let url = Url::parse(address).map_err(|e| QueryError::transport(address, e))?;

        tracing::debug!("Fetching {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| QueryError::transport(address, e))?;

        let url = response.url().clone();
        tracing::debug!("Fetched {} ({})", url, response.status());

        Ok(HttpResponse {
            url,
            body: Box::new(response),
        })
    }
}
