//! Slow listing backend for testing
//!
//! This module provides a decorator around any DirectoryFetcher that adds a
//! configurable delay to every listing call, simulating a slow endpoint
//! (remote storage behind a proxy, congested network, etc.). It also tracks
//! metrics so tests can assert how many requests the tree actually issued.

use super::{DirectoryFetcher, Listing, ListingError, ListingParams};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Metrics tracking for listing calls
#[derive(Debug, Clone, Default)]
pub struct FetchMetrics {
    /// Number of list_children calls
    pub list_calls: usize,
    /// Number of calls that returned an error
    pub failures: usize,
    /// Calls per requested path
    pub calls_by_path: HashMap<String, usize>,
    /// Highest number of calls in flight at the same time
    pub max_in_flight: usize,
    /// Total time spent in artificial delays
    pub total_delay_time: Duration,
    in_flight: usize,
}

impl FetchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all metrics to zero
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Calls made for one path
    pub fn calls_for(&self, path: &str) -> usize {
        self.calls_by_path.get(path).copied().unwrap_or(0)
    }
}

/// Slow listing wrapper
///
/// Wraps any DirectoryFetcher and delays each call by a fixed duration.
pub struct SlowFetcher {
    inner: Arc<dyn DirectoryFetcher>,
    delay: Duration,
    metrics: Arc<Mutex<FetchMetrics>>,
}

impl SlowFetcher {
    pub fn new(inner: Arc<dyn DirectoryFetcher>, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            metrics: Arc::new(Mutex::new(FetchMetrics::new())),
        }
    }

    /// Delays typical of a remote storage proxy
    pub fn slow_network(inner: Arc<dyn DirectoryFetcher>) -> Self {
        Self::new(inner, Duration::from_millis(500))
    }

    /// Get a snapshot of current metrics
    pub async fn metrics(&self) -> FetchMetrics {
        self.metrics.lock().await.clone()
    }

    pub async fn reset_metrics(&self) {
        self.metrics.lock().await.reset();
    }

    /// Get a clone of the metrics Arc for sharing
    pub fn metrics_arc(&self) -> Arc<Mutex<FetchMetrics>> {
        Arc::clone(&self.metrics)
    }
}

#[async_trait]
impl DirectoryFetcher for SlowFetcher {
    async fn list_children(
        &self,
        path: &str,
        params: &ListingParams,
    ) -> Result<Listing, ListingError> {
        {
            let mut metrics = self.metrics.lock().await;
            metrics.list_calls += 1;
            *metrics.calls_by_path.entry(path.to_string()).or_insert(0) += 1;
            metrics.in_flight += 1;
            metrics.max_in_flight = metrics.max_in_flight.max(metrics.in_flight);
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = self.inner.list_children(path, params).await;

        let mut metrics = self.metrics.lock().await;
        metrics.in_flight -= 1;
        metrics.total_delay_time += self.delay;
        if result.is_err() {
            metrics.failures += 1;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::listing::{ListingEntry, MemoryFetcher};
    use std::time::Instant;

    #[tokio::test]
    async fn test_slow_fetcher_adds_delay() {
        let inner = Arc::new(MemoryFetcher::new().with_dir("/", vec![ListingEntry::file("/a")]));
        let delay = Duration::from_millis(50);
        let slow = SlowFetcher::new(inner, delay);

        let start = Instant::now();
        let listing = slow.list_children("/", &ListingParams::default()).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(listing.len(), 1);
        assert!(elapsed >= delay, "Expected at least {:?}, got {:?}", delay, elapsed);

        let metrics = slow.metrics().await;
        assert_eq!(metrics.list_calls, 1);
        assert_eq!(metrics.calls_for("/"), 1);
        assert_eq!(metrics.total_delay_time, delay);
    }

    #[tokio::test]
    async fn test_metrics_track_failures_and_concurrency() {
        let inner = Arc::new(MemoryFetcher::new().with_dir("/a/", vec![]));
        let slow = Arc::new(SlowFetcher::new(inner, Duration::from_millis(20)));

        let a = {
            let slow = Arc::clone(&slow);
            tokio::spawn(async move { slow.list_children("/a/", &ListingParams::default()).await })
        };
        let missing = {
            let slow = Arc::clone(&slow);
            tokio::spawn(async move { slow.list_children("/b/", &ListingParams::default()).await })
        };

        assert!(a.await.unwrap().is_ok());
        assert!(missing.await.unwrap().is_err());

        let metrics = slow.metrics().await;
        assert_eq!(metrics.list_calls, 2);
        assert_eq!(metrics.failures, 1);
        assert_eq!(metrics.max_in_flight, 2);
    }

    #[tokio::test]
    async fn test_reset_metrics() {
        let inner = Arc::new(MemoryFetcher::new().with_dir("/", vec![]));
        let slow = SlowFetcher::new(inner, Duration::ZERO);

        slow.list_children("/", &ListingParams::default()).await.unwrap();
        assert_eq!(slow.metrics().await.list_calls, 1);

        slow.reset_metrics().await;
        assert_eq!(slow.metrics().await.list_calls, 0);
    }
}
