//! Historical volume tracking for rates and sparklines.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use super::metric::PosData;

/// Maximum number of historical samples to keep per POS.
const MAX_HISTORY_SIZE: usize = 60;

/// Tracks transaction volumes over time.
///
/// Records each refresh cycle so the presentation layer can show
/// transactions-per-second rates and volume trend sparklines.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Historical volume samples per POS id.
    volumes: HashMap<String, VecDeque<u64>>,
    /// Timestamps of recorded cycles, for rate calculations.
    timestamps: VecDeque<Instant>,
}

impl History {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a refresh cycle.
    pub fn record(&mut self, data: &PosData) {
        for metric in &data.pos {
            let samples = self.volumes.entry(metric.id.clone()).or_default();
            samples.push_back(metric.volume);
            if samples.len() > MAX_HISTORY_SIZE {
                samples.pop_front();
            }
        }

        self.timestamps.push_back(data.last_updated);
        if self.timestamps.len() > MAX_HISTORY_SIZE {
            self.timestamps.pop_front();
        }
    }

    /// Transactions per second for a POS, from the last two samples.
    ///
    /// Returns `None` until two cycles have been recorded.
    pub fn volume_rate(&self, pos_id: &str) -> Option<f64> {
        let samples = self.volumes.get(pos_id)?;
        if samples.len() < 2 || self.timestamps.len() < 2 {
            return None;
        }

        let current = *samples.back()?;
        let previous = *samples.get(samples.len() - 2)?;
        let delta = current as i64 - previous as i64;

        let current_time = self.timestamps.back()?;
        let previous_time = self.timestamps.get(self.timestamps.len() - 2)?;
        let elapsed = current_time.duration_since(*previous_time).as_secs_f64();

        if elapsed > 0.0 {
            Some(delta as f64 / elapsed)
        } else {
            None
        }
    }

    /// Volume-delta sparkline for a POS, normalized to 0-7 bar levels.
    ///
    /// Returns an empty Vec until two cycles have been recorded.
    pub fn volume_sparkline(&self, pos_id: &str) -> Vec<u8> {
        let Some(samples) = self.volumes.get(pos_id) else {
            return Vec::new();
        };
        if samples.len() < 2 {
            return Vec::new();
        }

        let deltas: Vec<i64> = samples
            .iter()
            .zip(samples.iter().skip(1))
            .map(|(a, b)| *b as i64 - *a as i64)
            .collect();

        let max = deltas.iter().copied().max().unwrap_or(1).max(1);
        let min = deltas.iter().copied().min().unwrap_or(0).min(0);
        let range = (max - min).max(1) as f64;

        deltas
            .iter()
            .map(|&v| {
                let normalized = ((v - min) as f64 / range * 7.0) as u8;
                normalized.min(7)
            })
            .collect()
    }
}
