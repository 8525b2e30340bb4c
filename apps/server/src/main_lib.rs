use std::sync::Arc;
use std::time::Duration;

use nse_market_data::symbols::MOVERS_UNIVERSE_SIZE;
use nse_market_data::{
    Clock, MarketService, MarketServiceConfig, QuoteProvider, SystemClock, YahooQuoteProvider,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub market: Arc<MarketService>,
}

pub fn init_tracing() {
    let log_format = std::env::var("NSE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Production state: Yahoo Finance behind the system clock.
pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let provider = Arc::new(YahooQuoteProvider::new()?);
    Ok(build_state_with(config, provider, Arc::new(SystemClock)))
}

pub fn build_state_with(
    config: &Config,
    provider: Arc<dyn QuoteProvider>,
    clock: Arc<dyn Clock>,
) -> Arc<AppState> {
    let fetch_timeout = fetch_timeout_within(config);
    if fetch_timeout < config.fetch_timeout {
        tracing::warn!(
            "Fetch timeout capped to {:?} to fit the {:?} request timeout",
            fetch_timeout,
            config.request_timeout
        );
    }
    tracing::info!(
        "Quote cache TTL {}s, fanout concurrency {}, fetch timeout {:?}",
        config.cache_ttl.as_secs(),
        config.fanout_concurrency,
        fetch_timeout
    );
    let market = MarketService::new(
        provider,
        clock,
        MarketServiceConfig {
            cache_ttl: config.cache_ttl,
            max_concurrency: config.fanout_concurrency,
            fetch_timeout,
        },
    );
    Arc::new(AppState {
        market: Arc::new(market),
    })
}

/// Per-call fetch timeout such that the widest fanout, run in waves of
/// `fanout_concurrency`, still finishes inside the request timeout.
fn fetch_timeout_within(config: &Config) -> Duration {
    let waves = MOVERS_UNIVERSE_SIZE.div_ceil(config.fanout_concurrency.max(1)) as u32;
    let budget = config.request_timeout / (waves + 1);
    config.fetch_timeout.min(budget)
}
