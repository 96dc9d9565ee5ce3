//! Connection settings for the API client.

use std::time::Duration;

use crate::error::{ClientError, Result};

/// Environment variable overriding the API base URL.
pub const API_HOST_ENV: &str = "LIBRIS_API_HOST";

/// Environment variable overriding the request timeout, in seconds.
pub const TIMEOUT_ENV: &str = "LIBRIS_TIMEOUT_SECS";

/// Base URL used when nothing else is configured.
pub const DEFAULT_API_HOST: &str = "http://localhost:8080";

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent sent with every request.
pub const USER_AGENT_VALUE: &str = concat!("libris/", env!("CARGO_PKG_VERSION"));

/// Where and how to reach the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme, host and optional port, without the `/v1` prefix.
    pub base_url: String,
    /// A request with no response after this long fails with a timeout.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_HOST)
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: USER_AGENT_VALUE.to_string(),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check that the base URL is an absolute http(s) URL and the timeout is nonzero.
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidConfig(format!("bad base URL {:?}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidConfig(format!(
                "base URL must use http or https, got {}",
                url.scheme()
            )));
        }
        if self.timeout.is_zero() {
            return Err(ClientError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Full URL for an API path such as `/v1/books`.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
