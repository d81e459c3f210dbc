//! File-based feed.
//!
//! Reads raw envelopes from a JSON snapshot file. Useful for local
//! inspection of captured payloads and for tests.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use super::{Feed, FeedError};

/// A feed that reads a JSON envelope from a file on each fetch.
#[derive(Debug, Clone)]
pub struct FileFeed {
    path: PathBuf,
    description: String,
}

impl FileFeed {
    /// Create a new file feed for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self { path, description }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Feed for FileFeed {
    async fn fetch(&self) -> Result<Value, FeedError> {
        let content =
            fs::read_to_string(&self.path).map_err(|e| FeedError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| FeedError::Parse(e.to_string()))
    }

    fn endpoint(&self) -> &str {
        &self.description
    }
}
