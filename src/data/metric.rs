//! Canonical POS metric model and health computation.
//!
//! This module defines the fixed-shape records the rest of the crate
//! consumes, plus the threshold logic that derives a health status when
//! the upstream feed does not supply one.

use std::time::Instant;

use serde::Serialize;
use serde_json::Value;

use super::normalize;

/// Thresholds for health status derivation.
///
/// A POS whose error rate reaches `error_warning` is in warning state;
/// reaching `error_critical` makes it critical. Both are fractions in [0, 1].
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Error-rate fraction that triggers a warning.
    pub error_warning: f64,
    /// Error-rate fraction that triggers critical status.
    pub error_critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            error_warning: 0.05,
            error_critical: 0.20,
        }
    }
}

/// Health status for a POS integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "OK",
            HealthStatus::Warning => "WARN",
            HealthStatus::Critical => "CRIT",
        }
    }

    /// Parse an upstream status string ("ok", "warning", "crit", ...).
    ///
    /// Returns `None` for anything unrecognized so the caller can fall back
    /// to threshold derivation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "healthy" | "ok" => Some(HealthStatus::Healthy),
            "warning" | "warn" => Some(HealthStatus::Warning),
            "critical" | "crit" => Some(HealthStatus::Critical),
            _ => None,
        }
    }

    /// Derive a status from an error-rate fraction.
    pub fn from_error_rate(error_rate: f64, thresholds: &Thresholds) -> Self {
        if error_rate >= thresholds.error_critical {
            HealthStatus::Critical
        } else if error_rate >= thresholds.error_warning {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }
}

/// One normalized POS metric record.
///
/// Invariants, regardless of upstream shape:
/// - `error_rate` and `success_rate` are clamped to [0, 1];
/// - `volume` and `avg_delay_hours` are finite and non-negative;
/// - `name` falls back to `"POS {id}"` when no name field resolved.
///
/// Id uniqueness is not enforced; duplicates from upstream pass through.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PosMetric {
    pub id: String,
    pub name: String,
    pub error_rate: f64,
    pub success_rate: f64,
    pub volume: u64,
    pub avg_delay_hours: f64,
    pub health: HealthStatus,
}

/// Which feed produced a normalized data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedRole {
    Primary,
    Fallback,
}

/// A complete normalized data set for one refresh cycle.
///
/// Constructed fresh on every cycle and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct PosData {
    pub pos: Vec<PosMetric>,
    pub role: FeedRole,
    pub last_updated: Instant,
}

impl PosData {
    /// Normalize a raw feed envelope into a data set.
    ///
    /// Never fails: unrecognized envelopes produce an empty record list,
    /// unresolved fields default per record.
    pub fn from_envelope(envelope: &Value, role: FeedRole, thresholds: &Thresholds) -> Self {
        let pos = normalize::detect_records(envelope)
            .iter()
            .filter(|r| !normalize::is_wrapper_record(r))
            .map(|r| normalize::normalize_record(r, thresholds))
            .collect();

        Self {
            pos,
            role,
            last_updated: Instant::now(),
        }
    }

    /// True when the cycle yielded no usable records.
    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }

    /// Count of records at the given health status.
    pub fn count_health(&self, status: HealthStatus) -> usize {
        self.pos.iter().filter(|p| p.health == status).count()
    }

    /// Worst health status across all records.
    pub fn overall_health(&self) -> HealthStatus {
        self.pos
            .iter()
            .map(|p| p.health)
            .max()
            .unwrap_or(HealthStatus::Healthy)
    }

    /// Total transaction volume across all records.
    pub fn total_volume(&self) -> u64 {
        self.pos.iter().map(|p| p.volume).sum()
    }
}
