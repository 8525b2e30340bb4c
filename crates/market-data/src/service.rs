//! Aggregate market views served by the API.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use tracing::info;

use crate::cache::{CachedValue, QuoteCache, DEFAULT_TTL};
use crate::clock::Clock;
use crate::fanout::{QuoteFanout, DEFAULT_MAX_CONCURRENCY};
use crate::fetcher::{QuoteFetcher, DEFAULT_FETCH_TIMEOUT};
use crate::market_status::{market_status_at, to_market_time};
use crate::models::{
    AggregateResponse, IndexQuote, MarketStatus, Quote, SearchResponse, StockResponse,
};
use crate::provider::QuoteProvider;
use crate::symbols::{
    normalize_symbol, search_symbols, MOVERS_UNIVERSE_SIZE, NIFTY_50_STOCKS, NSE_INDICES,
    STOCKS_VIEW_SIZE,
};
use crate::views::{rank_by_abs_change, to_index_quotes, top_gainers, top_losers};

const INDICES_KEY: &str = "indices_response";
const STOCKS_KEY: &str = "stocks_response";
const GAINERS_KEY: &str = "gainers_response";
const LOSERS_KEY: &str = "losers_response";

/// Tunables for [`MarketService`].
#[derive(Debug, Clone, Copy)]
pub struct MarketServiceConfig {
    pub cache_ttl: Duration,
    pub max_concurrency: usize,
    /// Bound on each provider call; a call that runs longer counts as a failure
    pub fetch_timeout: Duration,
}

impl Default for MarketServiceConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_TTL,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Builds the list views on top of a shared quote cache.
///
/// Per-symbol quotes and whole view responses share one cache and one TTL.
/// A view response is not invalidated when the quotes under it refresh, so
/// a view may lag the provider by up to twice the TTL.
pub struct MarketService {
    cache: Arc<QuoteCache>,
    fanout: QuoteFanout,
    clock: Arc<dyn Clock>,
}

impl MarketService {
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        clock: Arc<dyn Clock>,
        config: MarketServiceConfig,
    ) -> Self {
        let cache = Arc::new(QuoteCache::new(config.cache_ttl, clock.clone()));
        let fetcher = Arc::new(QuoteFetcher::with_timeout(
            provider,
            cache.clone(),
            config.fetch_timeout,
        ));
        Self {
            cache,
            fanout: QuoteFanout::new(fetcher, config.max_concurrency),
            clock,
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache.ttl()
    }

    /// Drop expired quotes and view responses. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.cache.purge_expired()
    }

    fn now(&self) -> DateTime<FixedOffset> {
        to_market_time(self.clock.now())
    }

    /// Benchmark and sector indices.
    pub async fn indices(&self) -> Arc<AggregateResponse<IndexQuote>> {
        if let Some(CachedValue::Indices(cached)) = self.cache.get(INDICES_KEY) {
            info!("Returning cached indices data");
            return cached;
        }

        info!("Fetching indices data");
        let symbols: Vec<&str> = NSE_INDICES.iter().map(|(_, symbol)| *symbol).collect();
        let quotes = self.fanout.fetch_many(&symbols).await;

        let data = to_index_quotes(quotes, || self.now());
        let response = Arc::new(AggregateResponse::new(data, self.now()));
        self.cache
            .put(INDICES_KEY, CachedValue::Indices(response.clone()));
        response
    }

    /// Snapshot of the leading stocks, biggest movers first.
    pub async fn stocks(&self) -> Arc<AggregateResponse<Quote>> {
        self.quotes_view(
            STOCKS_KEY,
            "stocks",
            &NIFTY_50_STOCKS[..STOCKS_VIEW_SIZE],
            rank_by_abs_change,
        )
        .await
    }

    pub async fn gainers(&self) -> Arc<AggregateResponse<Quote>> {
        self.quotes_view(
            GAINERS_KEY,
            "gainers",
            &NIFTY_50_STOCKS[..MOVERS_UNIVERSE_SIZE],
            top_gainers,
        )
        .await
    }

    pub async fn losers(&self) -> Arc<AggregateResponse<Quote>> {
        self.quotes_view(
            LOSERS_KEY,
            "losers",
            &NIFTY_50_STOCKS[..MOVERS_UNIVERSE_SIZE],
            top_losers,
        )
        .await
    }

    /// Master list stocks whose symbol contains `query`. Never cached as a
    /// whole; the quotes underneath still go through the per-symbol cache.
    pub async fn search(&self, query: &str) -> SearchResponse {
        let query = query.to_uppercase();
        let matches = search_symbols(&query);

        let data = if matches.is_empty() {
            Vec::new()
        } else {
            self.fanout.fetch_many(&matches).await
        };

        SearchResponse {
            success: true,
            query,
            count: data.len(),
            data,
        }
    }

    /// Single stock lookup; bare symbols are qualified with `.NS`.
    pub async fn stock(&self, symbol: &str) -> Option<StockResponse> {
        info!("Fetching {}", symbol);
        let symbol = normalize_symbol(symbol);
        let quote = self.fanout.fetcher().fetch(&symbol).await?;
        Some(StockResponse {
            success: true,
            data: quote,
            timestamp: self.now(),
        })
    }

    pub fn market_status(&self) -> MarketStatus {
        market_status_at(self.clock.now())
    }

    async fn quotes_view<F>(
        &self,
        key: &str,
        label: &str,
        symbols: &[&str],
        shape: F,
    ) -> Arc<AggregateResponse<Quote>>
    where
        F: FnOnce(Vec<Quote>) -> Vec<Quote>,
    {
        if let Some(CachedValue::Quotes(cached)) = self.cache.get(key) {
            info!("Returning cached {} data", label);
            return cached;
        }

        info!("Fetching {} data", label);
        let quotes = self.fanout.fetch_many(symbols).await;
        let response = Arc::new(AggregateResponse::new(shape(quotes), self.now()));
        self.cache.put(key, CachedValue::Quotes(response.clone()));
        response
    }
}
