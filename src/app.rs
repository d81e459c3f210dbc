//! Headless monitor state.
//!
//! Owns the resolver, the latest normalized data set, and the refresh
//! lifecycle. There is no retry or cancellation here: a failed cycle keeps
//! the previous data and surfaces the error until the next scheduled tick,
//! and whichever cycle resolves last wins.

use anyhow::Result;
use tracing::{debug, warn};

use crate::data::{HealthStatus, History, PosData, Thresholds};
use crate::feed::FallbackResolver;

/// Main monitor state.
pub struct Monitor {
    resolver: FallbackResolver,
    pub thresholds: Thresholds,
    pub data: Option<PosData>,
    pub history: History,
    pub load_error: Option<String>,
}

impl Monitor {
    /// Create a new monitor with the given resolver and thresholds.
    pub fn new(resolver: FallbackResolver, thresholds: Thresholds) -> Self {
        Self {
            resolver,
            thresholds,
            data: None,
            history: History::new(),
            load_error: None,
        }
    }

    /// Description of the primary feed.
    pub fn source_description(&self) -> &str {
        self.resolver.primary_endpoint()
    }

    /// Run one refresh cycle.
    ///
    /// On success the new data set replaces the old one and is recorded in
    /// history. On failure the previous data stays in place and the error
    /// is kept for display; the caller retries on its next tick.
    pub async fn refresh(&mut self) -> bool {
        match self.resolver.collect(&self.thresholds).await {
            Ok(data) => {
                debug!(records = data.pos.len(), role = ?data.role, "refreshed");
                self.history.record(&data);
                self.data = Some(data);
                self.load_error = None;
                true
            }
            Err(e) => {
                warn!(error = %e, "refresh failed");
                self.load_error = Some(e.to_string());
                false
            }
        }
    }

    /// Build an export document from the current state.
    pub fn summary(&self) -> serde_json::Value {
        let Some(data) = &self.data else {
            return serde_json::json!({ "summary": { "total_pos": 0 }, "pos": [] });
        };

        let pos: Vec<serde_json::Value> = data
            .pos
            .iter()
            .map(|m| {
                serde_json::json!({
                    "id": m.id,
                    "name": m.name,
                    "error_rate": m.error_rate,
                    "success_rate": m.success_rate,
                    "volume": m.volume,
                    "avg_delay_hours": m.avg_delay_hours,
                    "health": m.health,
                    "tx_rate": self.history.volume_rate(&m.id),
                })
            })
            .collect();

        let attention: Vec<serde_json::Value> = data
            .pos
            .iter()
            .filter(|m| m.health != HealthStatus::Healthy)
            .map(|m| {
                serde_json::json!({
                    "id": m.id,
                    "name": m.name,
                    "health": m.health,
                    "error_rate": m.error_rate,
                })
            })
            .collect();

        serde_json::json!({
            "summary": {
                "total_pos": data.pos.len(),
                "healthy": data.count_health(HealthStatus::Healthy),
                "warning": data.count_health(HealthStatus::Warning),
                "critical": data.count_health(HealthStatus::Critical),
                "total_volume": data.total_volume(),
                "source": data.role,
            },
            "pos": pos,
            "attention": attention,
        })
    }

    /// Export the current state as pretty JSON to a file.
    pub fn export_state(&self, path: &std::path::Path) -> Result<()> {
        use std::io::Write;

        if self.data.is_none() {
            anyhow::bail!("No data to export");
        }

        let json = serde_json::to_string_pretty(&self.summary())?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}
