//! Per-client cache of market parameters.
//!
//! Tick size, neg-risk flag and fee rate are looked up once per token and
//! then served from memory. Entries are never invalidated: a market whose
//! parameters change needs a fresh client, or per-order overrides.

use std::future::Future;

use dashmap::DashMap;
use tracing::debug;

use crate::rounding::TickSize;
use crate::Result;

/// Token id → market parameters, safe to share between tasks.
///
/// Two tasks missing the same key at once may both fetch it; the later
/// insert wins and both see a consistent value.
#[derive(Debug, Default)]
pub struct MarketParamsCache {
    tick_sizes: DashMap<String, TickSize>,
    neg_risk: DashMap<String, bool>,
    fee_rates: DashMap<String, u64>,
}

impl MarketParamsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn tick_size<F, Fut>(&self, token_id: &str, fetch: F) -> Result<TickSize>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TickSize>>,
    {
        get_or_fetch(&self.tick_sizes, token_id, "tick_size", fetch).await
    }

    pub async fn neg_risk<F, Fut>(&self, token_id: &str, fetch: F) -> Result<bool>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        get_or_fetch(&self.neg_risk, token_id, "neg_risk", fetch).await
    }

    pub async fn fee_rate_bps<F, Fut>(&self, token_id: &str, fetch: F) -> Result<u64>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<u64>>,
    {
        get_or_fetch(&self.fee_rates, token_id, "fee_rate_bps", fetch).await
    }

    pub fn insert_tick_size(&self, token_id: impl Into<String>, tick_size: TickSize) {
        self.tick_sizes.insert(token_id.into(), tick_size);
    }

    pub fn insert_neg_risk(&self, token_id: impl Into<String>, neg_risk: bool) {
        self.neg_risk.insert(token_id.into(), neg_risk);
    }

    pub fn insert_fee_rate_bps(&self, token_id: impl Into<String>, fee_rate_bps: u64) {
        self.fee_rates.insert(token_id.into(), fee_rate_bps);
    }

    pub fn cached_tick_size(&self, token_id: &str) -> Option<TickSize> {
        self.tick_sizes.get(token_id).map(|entry| *entry)
    }
}

// The map guard is dropped before awaiting so no shard lock is held across
// the fetch.
async fn get_or_fetch<V, F, Fut>(
    map: &DashMap<String, V>,
    token_id: &str,
    kind: &'static str,
    fetch: F,
) -> Result<V>
where
    V: Copy + std::fmt::Debug,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V>>,
{
    if let Some(cached) = map.get(token_id).map(|entry| *entry) {
        return Ok(cached);
    }

    let value = fetch().await?;
    map.insert(token_id.to_string(), value);
    debug!(token_id, kind, value = ?value, "Cached market parameter");
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fetches_once_then_serves_from_cache() {
        let cache = MarketParamsCache::new();
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        for _ in 0..3 {
            let tick = cache
                .tick_size("123", move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(TickSize::Hundredth)
                })
                .await
                .unwrap();
            assert_eq!(tick, TickSize::Hundredth);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.cached_tick_size("123"), Some(TickSize::Hundredth));
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = MarketParamsCache::new();

        tokio_test::assert_err!(
            cache
                .neg_risk("1", || async { Err(Error::validation("boom")) })
                .await
        );

        let value = tokio_test::assert_ok!(cache.neg_risk("1", || async { Ok(true) }).await);
        assert!(value);
    }

    #[tokio::test]
    async fn test_primed_values_skip_fetch() {
        let cache = MarketParamsCache::new();
        cache.insert_fee_rate_bps("9", 25);

        let fee = cache
            .fee_rate_bps("9", || async { Err(Error::validation("should not fetch")) })
            .await
            .unwrap();
        assert_eq!(fee, 25);
    }

    #[tokio::test]
    async fn test_concurrent_population() {
        let cache = Arc::new(MarketParamsCache::new());
        let mut handles = Vec::new();

        for i in 0..16 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                let token = format!("token-{}", i % 4);
                cache
                    .fee_rate_bps(&token, || async move { Ok((i % 4) as u64) })
                    .await
                    .unwrap()
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), (i % 4) as u64);
        }
    }
}
