//! Fetch pacing decorator.
//!
//! Mirror sites rate-limit aggressive clients. [`ThrottledFetcher`] wraps
//! any [`PageFetcher`] and sleeps a base delay plus bounded random jitter
//! before every outbound fetch, keeping resolution logic free of sleeps and
//! deterministically testable with an unwrapped fetcher.

use crate::error::ResolveResult;
use crate::fetch::{FetchedPage, PageFetcher};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// Default pause before each fetch.
pub const BASE_DELAY_MS: u64 = 2000;
/// Default upper bound on the added random jitter.
pub const JITTER_MS: u64 = 1000;

/// Delays every fetch by `base + rand(0..=jitter)` milliseconds.
pub struct ThrottledFetcher<F> {
    inner: F,
    base_ms: u64,
    jitter_ms: u64,
}

impl<F: PageFetcher> ThrottledFetcher<F> {
    /// Wrap `inner` with the default site-friendly pacing.
    pub fn new(inner: F) -> Self {
        Self::with_delays(inner, BASE_DELAY_MS, JITTER_MS)
    }

    /// Wrap `inner` with explicit delays.
    pub fn with_delays(inner: F, base_ms: u64, jitter_ms: u64) -> Self {
        Self {
            inner,
            base_ms,
            jitter_ms,
        }
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for ThrottledFetcher<F> {
    async fn fetch(&self, url: &str) -> ResolveResult<FetchedPage> {
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.jitter_ms)
        };
        tokio::time::sleep(Duration::from_millis(self.base_ms + jitter)).await;
        self.inner.fetch(url).await
    }
}
