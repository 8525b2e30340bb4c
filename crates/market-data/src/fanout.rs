//! Bounded-concurrency fetch over a set of symbols.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::debug;

use crate::fetcher::QuoteFetcher;
use crate::models::Quote;

/// Default number of symbol fetches in flight per batch.
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// Fetches many symbols at once with at most `max_concurrency` in flight.
///
/// Results come back in completion order, not input order. Symbols that
/// yield nothing are dropped; one bad symbol never fails the batch.
pub struct QuoteFanout {
    fetcher: Arc<QuoteFetcher>,
    max_concurrency: usize,
}

impl QuoteFanout {
    pub fn new(fetcher: Arc<QuoteFetcher>, max_concurrency: usize) -> Self {
        Self {
            fetcher,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn fetcher(&self) -> &QuoteFetcher {
        &self.fetcher
    }

    pub async fn fetch_many<S: AsRef<str>>(&self, symbols: &[S]) -> Vec<Quote> {
        let symbols: Vec<String> = symbols.iter().map(|s| s.as_ref().to_string()).collect();
        let requested = symbols.len();

        let quotes: Vec<Quote> = stream::iter(symbols)
            .map(|symbol| {
                let fetcher = Arc::clone(&self.fetcher);
                async move { fetcher.fetch(&symbol).await }
            })
            .buffer_unordered(self.max_concurrency)
            .filter_map(|quote| async move { quote })
            .collect()
            .await;

        debug!("Fetched {}/{} symbols", quotes.len(), requested);
        quotes
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::cache::{QuoteCache, DEFAULT_TTL};
    use crate::clock::ManualClock;
    use crate::errors::MarketDataError;
    use crate::fetcher::test_support::MockProvider;
    use crate::models::ProviderQuote;
    use crate::provider::QuoteProvider;

    fn cache() -> Arc<QuoteCache> {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 4, 5, 0, 0).unwrap(),
        ));
        Arc::new(QuoteCache::new(DEFAULT_TTL, clock))
    }

    #[tokio::test]
    async fn test_returns_only_successes() {
        let provider = Arc::new(
            MockProvider::new()
                .with_quote("A.NS", 10.0, 9.0)
                .with_quote("B.NS", 20.0, 21.0)
                .with_quote("C.NS", 30.0, 30.0)
                .with_failure("D.NS"),
        );
        let fetcher = Arc::new(QuoteFetcher::new(provider.clone(), cache()));
        let fanout = QuoteFanout::new(fetcher, DEFAULT_MAX_CONCURRENCY);

        let symbols = ["A.NS", "B.NS", "C.NS", "D.NS", "E.NS"];
        let quotes = fanout.fetch_many(&symbols).await;

        let got: HashSet<_> = quotes.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(got, HashSet::from(["A.NS", "B.NS", "C.NS"]));
        assert_eq!(provider.total_calls(), 5);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let provider = Arc::new(MockProvider::new());
        let fetcher = Arc::new(QuoteFetcher::new(provider.clone(), cache()));
        let fanout = QuoteFanout::new(fetcher, 4);

        let symbols: [&str; 0] = [];
        assert!(fanout.fetch_many(&symbols).await.is_empty());
        assert_eq!(provider.total_calls(), 0);
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let fetcher = Arc::new(QuoteFetcher::new(Arc::new(MockProvider::new()), cache()));
        assert_eq!(QuoteFanout::new(fetcher, 0).max_concurrency(), 1);
    }

    /// Provider that records the peak number of overlapping calls.
    #[derive(Default)]
    struct SlowProvider {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl QuoteProvider for SlowProvider {
        fn id(&self) -> &'static str {
            "SLOW"
        }

        async fn fetch_quote(&self, _symbol: &str) -> Result<ProviderQuote, MarketDataError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(ProviderQuote {
                price: 1.0,
                previous_close: Some(1.0),
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let provider = Arc::new(SlowProvider::default());
        let fetcher = Arc::new(QuoteFetcher::new(provider.clone(), cache()));
        let fanout = QuoteFanout::new(fetcher, 3);

        let symbols: Vec<String> = (0..12).map(|i| format!("S{}.NS", i)).collect();
        let quotes = fanout.fetch_many(&symbols).await;

        assert_eq!(quotes.len(), 12);
        let peak = provider.peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak concurrency was {}", peak);
        assert!(peak > 1, "fetches never overlapped");
    }
}
