//! Settings loading.
//!
//! Layered: built-in defaults, then an optional settings file, then
//! `POSWATCH_*` environment variables. CLI flags override on top of the
//! result in `main`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::Thresholds;

/// Monitor settings, as loaded from file/environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Primary feed URL (the all-POS summary endpoint).
    #[serde(default)]
    pub primary_url: Option<String>,
    /// Fallback feed URL (the top-5 snapshot endpoint).
    #[serde(default)]
    pub fallback_url: Option<String>,
    /// Refresh interval in seconds.
    pub refresh_secs: u64,
    /// Error-rate fraction that triggers a warning.
    pub error_warning: f64,
    /// Error-rate fraction that triggers critical status.
    pub error_critical: f64,
    /// Display names that always sort first, in order.
    pub priority: Vec<String>,
}

impl Settings {
    /// Load settings, optionally merging a settings file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Thresholds::default();

        let mut builder = config::Config::builder()
            .set_default("refresh_secs", 30i64)?
            .set_default("error_warning", defaults.error_warning)?
            .set_default("error_critical", defaults.error_critical)?
            .set_default(
                "priority",
                crate::data::rank::PRIORITY_POS
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>(),
            )?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        builder
            .add_source(config::Environment::with_prefix("POSWATCH"))
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    /// Thresholds derived from these settings.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            error_warning: self.error_warning,
            error_critical: self.error_critical,
        }
    }

    /// Priority list as borrowed strs, for [`crate::data::rank::prioritize`].
    pub fn priority_names(&self) -> Vec<&str> {
        self.priority.iter().map(String::as_str).collect()
    }
}

impl Default for Settings {
    fn default() -> Self {
        // the no-file load path only touches defaults and env, so a failure
        // here means a malformed POSWATCH_* variable
        Self::load(None).unwrap_or_else(|_| {
            let t = Thresholds::default();
            Self {
                primary_url: None,
                fallback_url: None,
                refresh_secs: 30,
                error_warning: t.error_warning,
                error_critical: t.error_critical,
                priority: crate::data::rank::PRIORITY_POS
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }
        })
    }
}
