//! Channel-based feed.
//!
//! Receives raw envelopes via a tokio watch channel. This is useful when
//! poswatch is embedded in another process that pushes payloads rather
//! than having them fetched.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

use super::{Feed, FeedError};

/// A feed that returns the most recently pushed envelope.
///
/// The producer sends envelopes through the channel; each fetch observes
/// the latest value (last-write-wins).
///
/// # Example
///
/// ```
/// use poswatch::ChannelFeed;
///
/// let (tx, feed) = ChannelFeed::create("embedded");
/// tx.send(serde_json::json!({ "items": [] })).unwrap();
/// ```
#[derive(Debug)]
pub struct ChannelFeed {
    receiver: watch::Receiver<Value>,
    description: String,
}

impl ChannelFeed {
    /// Create a new channel feed from an existing receiver.
    pub fn new(receiver: watch::Receiver<Value>, source_description: &str) -> Self {
        let description = format!("channel: {}", source_description);
        Self {
            receiver,
            description,
        }
    }

    /// Create a channel pair for pushing envelopes to a feed.
    ///
    /// Returns (sender, feed). Until the first send, fetches observe a
    /// null envelope, which normalizes to an empty record list.
    pub fn create(source_description: &str) -> (watch::Sender<Value>, Self) {
        let (tx, rx) = watch::channel(Value::Null);
        let feed = Self::new(rx, source_description);
        (tx, feed)
    }
}

#[async_trait]
impl Feed for ChannelFeed {
    async fn fetch(&self) -> Result<Value, FeedError> {
        Ok(self.receiver.borrow().clone())
    }

    fn endpoint(&self) -> &str {
        &self.description
    }
}
