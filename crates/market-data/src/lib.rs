//! NSE Market Data Crate
//!
//! Cached quote fetching for Indian equities and indices, plus the aggregate
//! views (indices, stocks, gainers, losers, search) served by the API.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |  MarketService   |  (views, response-level cache)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |   QuoteFanout    |  (bounded concurrency, drops failures)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |   QuoteFetcher   | <-> |     TtlCache     |  (per-symbol cache)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |  QuoteProvider   |  (Yahoo Finance)
//! +------------------+
//! ```
//!
//! Time enters only through [`Clock`], so expiry and session hours can be
//! driven by a [`ManualClock`] in tests.

pub mod cache;
pub mod clock;
pub mod errors;
pub mod fanout;
pub mod fetcher;
pub mod market_status;
pub mod models;
pub mod provider;
pub mod service;
pub mod symbols;
pub mod views;

pub use cache::{CachedValue, QuoteCache, TtlCache, DEFAULT_TTL};
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::MarketDataError;
pub use fanout::{QuoteFanout, DEFAULT_MAX_CONCURRENCY};
pub use fetcher::{QuoteFetcher, DEFAULT_FETCH_TIMEOUT};
pub use market_status::{is_market_open, market_status_at};
pub use models::{
    AggregateResponse, IndexQuote, MarketStatus, ProviderQuote, Quote, SearchResponse,
    StockResponse,
};
pub use provider::yahoo::YahooQuoteProvider;
pub use provider::QuoteProvider;
pub use service::{MarketService, MarketServiceConfig};
