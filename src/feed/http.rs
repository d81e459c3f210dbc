//! HTTP feed.
//!
//! Fetches raw envelopes from an analytics endpoint over HTTP. The endpoint
//! is expected to return a JSON envelope; its shape is detected downstream.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{Feed, FeedError};

/// A feed that GETs a JSON envelope from an HTTP endpoint.
///
/// # Example
///
/// ```no_run
/// use poswatch::HttpFeed;
///
/// let feed = HttpFeed::builder()
///     .endpoint("https://analytics.example.com/stats/all-pos-summary")
///     .credentials("monitor", "secret")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct HttpFeed {
    client: Client,
    endpoint: String,
    credentials: Option<(String, String)>,
}

impl HttpFeed {
    /// Create a new builder for configuring the feed.
    pub fn builder() -> HttpFeedBuilder {
        HttpFeedBuilder::default()
    }
}

#[async_trait]
impl Feed for HttpFeed {
    async fn fetch(&self) -> Result<Value, FeedError> {
        let mut request = self.client.get(&self.endpoint);
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request.send().await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(FeedError::Auth("Invalid credentials".to_string()));
        }

        if !response.status().is_success() {
            return Err(FeedError::Http(format!(
                "endpoint returned status {}",
                response.status()
            )));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| FeedError::Parse(e.to_string()))?;

        Ok(envelope)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Builder for [`HttpFeed`].
#[derive(Debug, Default)]
pub struct HttpFeedBuilder {
    endpoint: Option<String>,
    username: Option<String>,
    password: Option<String>,
    timeout: Option<Duration>,
}

impl HttpFeedBuilder {
    /// Set the endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set basic-auth credentials.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the feed.
    pub fn build(self) -> HttpFeed {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        let credentials = match (self.username, self.password) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        };

        HttpFeed {
            client,
            endpoint: self.endpoint.unwrap_or_default(),
            credentials,
        }
    }
}
