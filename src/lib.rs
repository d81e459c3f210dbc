//! # poswatch
//!
//! A headless monitor and library for POS (point-of-sale) transaction
//! health feeds.
//!
//! This crate normalizes the loosely-typed telemetry that upstream
//! analytics endpoints emit — the same logical data arrives under varying
//! envelope keys, field aliases, and value encodings — into a canonical
//! per-POS metric model, with a fallback feed consulted whenever the
//! primary yields no usable records.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐     ┌──────────┐     ┌─────────────────────┐   │
//! │  │ Monitor │────▶│   data   │────▶│ table / JSON export │   │
//! │  │ (state) │     │(normalize)     └─────────────────────┘   │
//! │  └────┬────┘     └──────────┘                               │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌──────────┐                                               │
//! │  │ resolver │◀── HttpFeed | FileFeed | ChannelFeed          │
//! │  │ (feeds)  │                                               │
//! │  └──────────┘                                               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: the headless [`Monitor`] driving refresh cycles
//! - **[`feed`]**: feed abstraction ([`Feed`] trait) with HTTP, file, and
//!   channel implementations, plus the [`FallbackResolver`]
//! - **[`data`]**: shape detection, field normalization, per-channel
//!   aggregation, health thresholds, history, and display ranking
//! - **[`settings`]**: layered configuration (defaults, file, environment)
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Poll the summary endpoint, fall back to the top-5 snapshot
//! poswatch --url https://analytics.example.com/stats/all-pos-summary \
//!          --fallback-url https://analytics.example.com/stats/top5
//!
//! # One-shot export of a local snapshot file
//! poswatch --file summary.json --export state.json
//! ```
//!
//! ### As a library with a file feed
//!
//! ```
//! use poswatch::{FallbackResolver, FileFeed, Monitor, Thresholds};
//!
//! let resolver = FallbackResolver::new(Box::new(FileFeed::new("summary.json")));
//! let monitor = Monitor::new(resolver, Thresholds::default());
//! ```
//!
//! ### As a library with a channel feed (for embedding)
//!
//! ```
//! use poswatch::{ChannelFeed, FallbackResolver, Monitor, Thresholds};
//!
//! let (tx, feed) = ChannelFeed::create("embedded");
//! let monitor = Monitor::new(
//!     FallbackResolver::new(Box::new(feed)),
//!     Thresholds::default(),
//! );
//! tx.send(serde_json::json!({ "items": [] })).unwrap();
//! ```

pub mod app;
pub mod data;
pub mod feed;
pub mod settings;

// Re-export main types for convenience
pub use app::Monitor;
pub use data::{FeedRole, HealthStatus, History, PosData, PosMetric, Thresholds};
pub use feed::{ChannelFeed, FallbackResolver, Feed, FeedError, FileFeed, HttpFeed};
pub use settings::Settings;
