//! Fallback resolution between a primary and a secondary feed.

use tracing::debug;

use crate::data::{FeedRole, PosData, Thresholds};

use super::{Feed, FeedError};

/// Resolves a data set from a primary feed with an optional fallback.
///
/// The fallback is consulted only when the primary's normalized record list
/// comes back with length exactly zero — a non-empty but partial result
/// never triggers it. An empty fallback result is not an error either; it
/// surfaces as a legitimate "no data" state.
#[derive(Debug)]
pub struct FallbackResolver {
    primary: Box<dyn Feed>,
    fallback: Option<Box<dyn Feed>>,
}

impl FallbackResolver {
    /// Create a resolver with a primary feed only.
    pub fn new(primary: Box<dyn Feed>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    /// Attach a fallback feed.
    pub fn with_fallback(mut self, fallback: Box<dyn Feed>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Description of the primary feed.
    pub fn primary_endpoint(&self) -> &str {
        self.primary.endpoint()
    }

    /// Fetch and normalize one data set.
    ///
    /// Transport errors from either feed propagate; payload-shape problems
    /// never do — they normalize into defaults or an empty list.
    pub async fn collect(&self, thresholds: &Thresholds) -> Result<PosData, FeedError> {
        let envelope = self.primary.fetch().await?;
        let data = PosData::from_envelope(&envelope, FeedRole::Primary, thresholds);
        if !data.is_empty() {
            return Ok(data);
        }

        let Some(fallback) = &self.fallback else {
            return Ok(data);
        };

        debug!(endpoint = fallback.endpoint(), "primary feed empty, trying fallback");
        let envelope = fallback.fetch().await?;
        Ok(PosData::from_envelope(
            &envelope,
            FeedRole::Fallback,
            thresholds,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Test feed returning a fixed envelope and counting fetches.
    #[derive(Debug)]
    struct StaticFeed {
        envelope: Value,
        calls: Arc<AtomicUsize>,
    }

    impl StaticFeed {
        fn new(envelope: Value) -> (Box<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let feed = Box::new(Self {
                envelope,
                calls: calls.clone(),
            });
            (feed, calls)
        }
    }

    #[async_trait]
    impl Feed for StaticFeed {
        async fn fetch(&self) -> Result<Value, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.envelope.clone())
        }

        fn endpoint(&self) -> &str {
            "static"
        }
    }

    fn empty_primary() -> Value {
        json!({ "data": { "pos_list": [] } })
    }

    fn one_record_primary() -> Value {
        json!({ "data": { "pos_list": [{ "id": "2", "name": "POS 2" }] } })
    }

    fn top5_fallback() -> Value {
        json!({ "items": [
            { "posId": "63", "posName": "POS 63", "errorRate": 15 },
            { "posId": "11", "posName": "POS 11", "errorRate": 0.01 }
        ] })
    }

    #[tokio::test]
    async fn test_empty_primary_triggers_fallback() {
        let (primary, primary_calls) = StaticFeed::new(empty_primary());
        let (fallback, fallback_calls) = StaticFeed::new(top5_fallback());
        let resolver = FallbackResolver::new(primary).with_fallback(fallback);

        let data = resolver.collect(&Thresholds::default()).await.unwrap();

        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
        assert_eq!(data.role, FeedRole::Fallback);
        assert_eq!(data.pos.len(), 2);
        assert!((data.pos[0].error_rate - 0.15).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_non_empty_primary_never_falls_back() {
        let (primary, _) = StaticFeed::new(one_record_primary());
        let (fallback, fallback_calls) = StaticFeed::new(top5_fallback());
        let resolver = FallbackResolver::new(primary).with_fallback(fallback);

        let data = resolver.collect(&Thresholds::default()).await.unwrap();

        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
        assert_eq!(data.role, FeedRole::Primary);
        assert_eq!(data.pos.len(), 1);
    }

    #[tokio::test]
    async fn test_both_empty_is_no_data_not_error() {
        let (primary, _) = StaticFeed::new(empty_primary());
        let (fallback, _) = StaticFeed::new(json!({ "items": [] }));
        let resolver = FallbackResolver::new(primary).with_fallback(fallback);

        let data = resolver.collect(&Thresholds::default()).await.unwrap();
        assert!(data.is_empty());
        assert_eq!(data.role, FeedRole::Fallback);
    }

    #[tokio::test]
    async fn test_empty_primary_without_fallback() {
        let (primary, _) = StaticFeed::new(empty_primary());
        let resolver = FallbackResolver::new(primary);

        let data = resolver.collect(&Thresholds::default()).await.unwrap();
        assert!(data.is_empty());
        assert_eq!(data.role, FeedRole::Primary);
    }

    #[tokio::test]
    async fn test_wrapper_records_do_not_count_as_data() {
        // a leaked wrapper object normalizes away; the cleaned list is
        // empty, so the fallback must fire
        let (primary, _) = StaticFeed::new(json!({
            "data": { "alerts": [{ "alerts": [], "severity": "high" }] }
        }));
        let (fallback, fallback_calls) = StaticFeed::new(top5_fallback());
        let resolver = FallbackResolver::new(primary).with_fallback(fallback);

        let data = resolver.collect(&Thresholds::default()).await.unwrap();
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
        assert_eq!(data.pos.len(), 2);
    }
}
