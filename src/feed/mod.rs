//! Feed abstraction for fetching raw telemetry envelopes.
//!
//! A [`Feed`] hands back the upstream response as parsed JSON and nothing
//! more; transport concerns (TLS, headers, status codes) stop here. The
//! normalization core in [`crate::data`] never sees them.

mod channel;
mod file;
mod http;
mod resolver;

pub use channel::ChannelFeed;
pub use file::FileFeed;
pub use http::{HttpFeed, HttpFeedBuilder};
pub use resolver::FallbackResolver;

use std::fmt::Debug;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while fetching from a feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse the response body.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for a response.
    #[error("Request timed out")]
    Timeout,

    /// Local I/O failed (file feeds).
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::Timeout
        } else if err.is_connect() {
            FeedError::Connection(err.to_string())
        } else if err.is_decode() {
            FeedError::Parse(err.to_string())
        } else {
            FeedError::Http(err.to_string())
        }
    }
}

/// Trait for fetching raw telemetry envelopes from various backends.
///
/// Implementations fetch one envelope per call — HTTP endpoints, snapshot
/// files, or in-process channels. The envelope shape is deliberately
/// untyped; shape detection happens downstream.
///
/// # Example
///
/// ```
/// use poswatch::{FileFeed, Feed};
///
/// # tokio_test::block_on(async {
/// let feed = FileFeed::new("pos-summary.json");
/// assert_eq!(feed.endpoint(), "file: pos-summary.json");
/// assert!(feed.fetch().await.is_err()); // file does not exist
/// # });
/// ```
#[async_trait]
pub trait Feed: Send + Sync + Debug {
    /// Fetch the latest raw envelope.
    async fn fetch(&self) -> Result<Value, FeedError>;

    /// Human-readable description of the feed, for status display.
    fn endpoint(&self) -> &str;
}
