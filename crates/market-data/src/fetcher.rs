//! Cache-aware single symbol fetch.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use crate::cache::{stock_key, CachedValue, QuoteCache};
use crate::models::Quote;
use crate::provider::QuoteProvider;

/// Upper bound on a single provider call.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Wraps one upstream call with a cache lookup before and a cache store after.
///
/// Failures never escape: a provider miss, error or timeout yields `None` and
/// is not cached, so the next request retries the provider.
pub struct QuoteFetcher {
    provider: Arc<dyn QuoteProvider>,
    cache: Arc<QuoteCache>,
    timeout: Duration,
}

impl QuoteFetcher {
    pub fn new(provider: Arc<dyn QuoteProvider>, cache: Arc<QuoteCache>) -> Self {
        Self::with_timeout(provider, cache, DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(
        provider: Arc<dyn QuoteProvider>,
        cache: Arc<QuoteCache>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            timeout,
        }
    }

    pub async fn fetch(&self, symbol: &str) -> Option<Quote> {
        let key = stock_key(symbol);
        if let Some(CachedValue::Quote(quote)) = self.cache.get(&key) {
            return Some(quote);
        }

        let call = tokio::time::timeout(self.timeout, self.provider.fetch_quote(symbol));
        let raw = match call.await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) if e.is_provider_miss() => {
                debug!("{} returned no data for {}: {}", self.provider.id(), symbol, e);
                return None;
            }
            Ok(Err(e)) => {
                error!("Error fetching {}: {}", symbol, e);
                return None;
            }
            Err(_) => {
                error!(
                    "Error fetching {}: {} timed out after {:?}",
                    symbol,
                    self.provider.id(),
                    self.timeout
                );
                return None;
            }
        };

        let quote = match Quote::from_provider(symbol, raw) {
            Ok(quote) => quote,
            Err(e) => {
                error!("Error fetching {}: {}", symbol, e);
                return None;
            }
        };

        self.cache.put(key, CachedValue::Quote(quote.clone()));
        Some(quote)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::errors::MarketDataError;
    use crate::models::ProviderQuote;
    use crate::provider::QuoteProvider;

    /// Scripted provider that counts calls per symbol.
    ///
    /// Symbols without a script behave like a provider miss.
    #[derive(Default)]
    pub struct MockProvider {
        quotes: HashMap<String, (f64, f64)>,
        failing: Vec<String>,
        hanging: Vec<String>,
        calls: Mutex<HashMap<String, usize>>,
        total: AtomicUsize,
    }

    impl MockProvider {
        pub fn new() -> Self {
            Self::default()
        }

        /// Script a quote from price and previous close.
        pub fn with_quote(mut self, symbol: &str, price: f64, previous_close: f64) -> Self {
            self.quotes
                .insert(symbol.to_string(), (price, previous_close));
            self
        }

        /// Script a hard provider failure.
        pub fn with_failure(mut self, symbol: &str) -> Self {
            self.failing.push(symbol.to_string());
            self
        }

        /// Script a call that never completes in test time.
        pub fn with_hang(mut self, symbol: &str) -> Self {
            self.hanging.push(symbol.to_string());
            self
        }

        pub fn calls_for(&self, symbol: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .get(symbol)
                .copied()
                .unwrap_or(0)
        }

        pub fn total_calls(&self) -> usize {
            self.total.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuoteProvider for MockProvider {
        fn id(&self) -> &'static str {
            "MOCK"
        }

        async fn fetch_quote(&self, symbol: &str) -> Result<ProviderQuote, MarketDataError> {
            self.total.fetch_add(1, Ordering::SeqCst);
            *self
                .calls
                .lock()
                .unwrap()
                .entry(symbol.to_string())
                .or_insert(0) += 1;

            if self.hanging.iter().any(|s| s == symbol) {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            }

            if self.failing.iter().any(|s| s == symbol) {
                return Err(MarketDataError::ProviderError {
                    provider: "MOCK".to_string(),
                    message: "boom".to_string(),
                });
            }

            match self.quotes.get(symbol) {
                Some((price, previous_close)) => Ok(ProviderQuote {
                    price: *price,
                    previous_close: Some(*previous_close),
                    ..Default::default()
                }),
                None => Err(MarketDataError::NoPriceHistory(symbol.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::MockProvider;
    use super::*;
    use crate::cache::DEFAULT_TTL;
    use crate::clock::ManualClock;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn setup(provider: MockProvider) -> (Arc<ManualClock>, Arc<MockProvider>, QuoteFetcher) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 4, 5, 0, 0).unwrap(),
        ));
        let provider = Arc::new(provider);
        let cache = Arc::new(QuoteCache::new(DEFAULT_TTL, clock.clone()));
        let fetcher = QuoteFetcher::new(provider.clone(), cache);
        (clock, provider, fetcher)
    }

    #[tokio::test]
    async fn test_fetch_builds_quote() {
        let (_, _, fetcher) = setup(MockProvider::new().with_quote("INFY.NS", 1520.0, 1500.0));
        let quote = fetcher.fetch("INFY.NS").await.unwrap();
        assert_eq!(quote.symbol, "INFY.NS");
        assert_eq!(quote.change, dec!(20));
        assert_eq!(quote.change_percent, dec!(1.33));
    }

    #[tokio::test]
    async fn test_cached_quote_skips_provider() {
        let (_, provider, fetcher) = setup(MockProvider::new().with_quote("TCS.NS", 10.0, 9.0));

        let first = fetcher.fetch("TCS.NS").await.unwrap();
        let second = fetcher.fetch("TCS.NS").await.unwrap();
        let third = fetcher.fetch("TCS.NS").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(provider.calls_for("TCS.NS"), 1);
    }

    #[tokio::test]
    async fn test_refetches_after_ttl() {
        let (clock, provider, fetcher) = setup(MockProvider::new().with_quote("TCS.NS", 10.0, 9.0));

        fetcher.fetch("TCS.NS").await.unwrap();
        clock.advance(chrono::Duration::seconds(60));
        fetcher.fetch("TCS.NS").await.unwrap();

        assert_eq!(provider.calls_for("TCS.NS"), 2);
    }

    #[tokio::test]
    async fn test_miss_is_not_cached() {
        let (_, provider, fetcher) = setup(MockProvider::new());

        assert!(fetcher.fetch("GONE.NS").await.is_none());
        assert!(fetcher.fetch("GONE.NS").await.is_none());

        assert_eq!(provider.calls_for("GONE.NS"), 2);
    }

    #[tokio::test]
    async fn test_provider_error_is_absorbed_and_not_cached() {
        let (_, provider, fetcher) = setup(MockProvider::new().with_failure("ERR.NS"));

        assert!(fetcher.fetch("ERR.NS").await.is_none());
        assert!(fetcher.fetch("ERR.NS").await.is_none());

        assert_eq!(provider.calls_for("ERR.NS"), 2);
    }

    #[tokio::test]
    async fn test_zero_previous_close() {
        let (_, _, fetcher) = setup(MockProvider::new().with_quote("ZERO.NS", 5.0, 0.0));
        let quote = fetcher.fetch("ZERO.NS").await.unwrap();
        assert_eq!(quote.change_percent, dec!(0));
    }

    #[tokio::test]
    async fn test_hung_provider_times_out_and_is_not_cached() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 4, 5, 0, 0).unwrap(),
        ));
        let provider = Arc::new(MockProvider::new().with_hang("SLOW.NS"));
        let cache = Arc::new(QuoteCache::new(DEFAULT_TTL, clock));
        let fetcher = QuoteFetcher::with_timeout(
            provider.clone(),
            cache.clone(),
            Duration::from_millis(20),
        );

        assert!(fetcher.fetch("SLOW.NS").await.is_none());
        assert!(cache.is_empty());
        assert!(fetcher.fetch("SLOW.NS").await.is_none());
        assert_eq!(provider.calls_for("SLOW.NS"), 2);
    }
}
