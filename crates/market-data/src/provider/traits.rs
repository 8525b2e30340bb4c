//! Quote provider trait definition.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::ProviderQuote;

/// Upstream source of quote snapshots.
///
/// Implementations perform the actual I/O and make no caching decisions;
/// caching and failure absorption belong to
/// [`QuoteFetcher`](crate::fetcher::QuoteFetcher).
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use nse_market_data::{MarketDataError, ProviderQuote, QuoteProvider};
///
/// struct FixedProvider;
///
/// #[async_trait]
/// impl QuoteProvider for FixedProvider {
///     fn id(&self) -> &'static str {
///         "FIXED"
///     }
///
///     async fn fetch_quote(&self, symbol: &str) -> Result<ProviderQuote, MarketDataError> {
///         Ok(ProviderQuote { price: 100.0, ..Default::default() })
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider, used in logs and errors.
    fn id(&self) -> &'static str;

    /// Fetch the latest snapshot for a provider symbol (e.g. "INFY.NS", "^NSEI").
    ///
    /// Returns [`MarketDataError::NoPriceHistory`] when the symbol has no
    /// usable price data, and any other variant for genuine failures.
    async fn fetch_quote(&self, symbol: &str) -> Result<ProviderQuote, MarketDataError>;
}
