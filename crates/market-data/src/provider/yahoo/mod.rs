//! Yahoo Finance quote provider.
//!
//! A quote is assembled from two Yahoo endpoints:
//! - the chart API (through `yahoo_finance_api`) for the latest daily bar
//! - the quoteSummary API for previous close, names, sector and market cap
//!
//! NSE symbols carry the `.NS` suffix, BSE symbols `.BO`, indices a `^` prefix.

mod models;

use std::future::Future;

use async_trait::async_trait;
use reqwest::header;
use tokio::sync::Mutex;
use tracing::debug;
use urlencoding::encode;
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::ProviderQuote;
use crate::provider::QuoteProvider;

use models::{YahooQuoteSummaryResponse, YahooQuoteSummaryResult};

const PROVIDER_ID: &str = "YAHOO";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Cached Yahoo authentication data
#[derive(Debug, Clone)]
struct CrumbData {
    cookie: String,
    crumb: String,
}

/// OHLCV values of one chart bar
#[derive(Debug, Clone, Copy)]
struct DailyBar {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

impl From<yahoo::Quote> for DailyBar {
    fn from(quote: yahoo::Quote) -> Self {
        Self {
            open: quote.open,
            high: quote.high,
            low: quote.low,
            close: quote.close,
            volume: quote.volume,
        }
    }
}

/// Yahoo Finance quote provider.
pub struct YahooQuoteProvider {
    connector: yahoo::YahooConnector,
    client: reqwest::Client,
    /// Held across the handshake so concurrent cold requests share one crumb
    crumb: Mutex<Option<CrumbData>>,
}

impl YahooQuoteProvider {
    /// Create a new Yahoo Finance provider.
    pub fn new() -> Result<Self, MarketDataError> {
        let connector = yahoo::YahooConnector::new().map_err(|e| provider_error(format!(
            "Failed to initialize Yahoo connector: {}",
            e
        )))?;
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            connector,
            client,
            crumb: Mutex::new(None),
        })
    }

    // ========================================================================
    // Crumb/Cookie Authentication
    // ========================================================================

    /// Ensure we have a valid Yahoo authentication crumb.
    async fn ensure_crumb(&self) -> Result<CrumbData, MarketDataError> {
        cached_or_fetch(&self.crumb, || self.fetch_crumb()).await
    }

    /// Fetch a new Yahoo authentication crumb.
    async fn fetch_crumb(&self) -> Result<CrumbData, MarketDataError> {
        // Step 1: cookie from fc.yahoo.com
        let response = self
            .client
            .get("https://fc.yahoo.com")
            .send()
            .await
            .map_err(|e| provider_error(format!("Failed to get cookie: {}", e)))?;

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(v, _)| v.to_string()))
            .ok_or_else(|| provider_error("Failed to parse Yahoo cookie".to_string()))?;

        // Step 2: crumb using that cookie
        let crumb = self
            .client
            .get("https://query1.finance.yahoo.com/v1/test/getcrumb")
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .map_err(|e| provider_error(format!("Failed to get crumb: {}", e)))?
            .text()
            .await
            .map_err(|e| provider_error(format!("Failed to read crumb: {}", e)))?;

        debug!("Obtained new Yahoo crumb");
        Ok(CrumbData { cookie, crumb })
    }

    /// Clear the cached crumb (used when authentication fails)
    async fn clear_crumb(&self) {
        *self.crumb.lock().await = None;
    }

    // ========================================================================
    // Fetching
    // ========================================================================

    /// Latest daily OHLCV bar from the chart API.
    async fn fetch_daily_bar(&self, symbol: &str) -> Result<DailyBar, MarketDataError> {
        let response = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| map_yahoo_error(symbol, e))?;

        response.last_quote().map(DailyBar::from).map_err(|e| {
            debug!("No daily bar returned for {}: {}", symbol, e);
            MarketDataError::NoPriceHistory(symbol.to_string())
        })
    }

    /// Profile and previous close from the quoteSummary API.
    ///
    /// `None` when Yahoo knows the chart but has no summary for the symbol.
    async fn fetch_summary(
        &self,
        symbol: &str,
    ) -> Result<Option<YahooQuoteSummaryResult>, MarketDataError> {
        let crumb = self.ensure_crumb().await?;

        let url = format!(
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{}?modules=price,summaryProfile,summaryDetail&crumb={}",
            encode(symbol),
            encode(&crumb.crumb)
        );

        let response = self
            .client
            .get(&url)
            .header(header::COOKIE, &crumb.cookie)
            .send()
            .await
            .map_err(|e| provider_error(format!("Summary request failed: {}", e)))?;

        match response.status() {
            reqwest::StatusCode::UNAUTHORIZED => {
                self.clear_crumb().await;
                return Err(provider_error("Yahoo authentication expired".to_string()));
            }
            reqwest::StatusCode::NOT_FOUND => return Ok(None),
            _ => {}
        }

        let data: YahooQuoteSummaryResponse = response
            .json()
            .await
            .map_err(|e| provider_error(format!("Failed to parse summary response: {}", e)))?;

        Ok(data
            .quote_summary
            .result
            .and_then(|results| results.into_iter().next()))
    }
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<ProviderQuote, MarketDataError> {
        debug!("Fetching quote for {} from Yahoo", symbol);

        let (bar, summary) =
            futures::try_join!(self.fetch_daily_bar(symbol), self.fetch_summary(symbol))?;

        Ok(to_provider_quote(bar, summary.as_ref()))
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Return the value in `slot`, filling it with `fetch` first if empty.
///
/// The lock is held while fetching, so callers racing on an empty slot wait
/// for the first fetch instead of starting their own. A failed fetch leaves
/// the slot empty for the next caller.
async fn cached_or_fetch<T, F, Fut>(
    slot: &Mutex<Option<T>>,
    fetch: F,
) -> Result<T, MarketDataError>
where
    T: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, MarketDataError>>,
{
    let mut guard = slot.lock().await;
    if let Some(value) = guard.as_ref() {
        return Ok(value.clone());
    }
    let value = fetch().await?;
    *guard = Some(value.clone());
    Ok(value)
}

fn provider_error(message: String) -> MarketDataError {
    MarketDataError::ProviderError {
        provider: PROVIDER_ID.to_string(),
        message,
    }
}

fn map_yahoo_error(symbol: &str, error: yahoo::YahooError) -> MarketDataError {
    if matches!(error, yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) {
        MarketDataError::NoPriceHistory(symbol.to_string())
    } else {
        provider_error(error.to_string())
    }
}

fn to_provider_quote(bar: DailyBar, summary: Option<&YahooQuoteSummaryResult>) -> ProviderQuote {
    let profile = summary.and_then(|s| s.summary_profile.as_ref());
    ProviderQuote {
        price: bar.close,
        previous_close: summary.and_then(|s| s.previous_close()),
        open: Some(bar.open).filter(|v| v.is_finite()),
        high: Some(bar.high).filter(|v| v.is_finite()),
        low: Some(bar.low).filter(|v| v.is_finite()),
        volume: Some(bar.volume),
        market_cap: summary.and_then(|s| s.market_cap()),
        name: summary.and_then(|s| s.long_name()),
        sector: profile.and_then(|p| p.sector.clone()),
        industry: profile.and_then(|p| p.industry.clone()),
    }
}
