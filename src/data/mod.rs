//! Data models and normalization.
//!
//! Converts raw feed envelopes into canonical [`PosMetric`] records with
//! derived health status, tracks history across refresh cycles, and orders
//! records for display.

pub mod delay;
pub mod history;
pub mod metric;
pub mod normalize;
pub mod rank;

pub use history::History;
pub use metric::{FeedRole, HealthStatus, PosData, PosMetric, Thresholds};
