//! Error types for the market data crate.
//!
//! Every provider failure is expressed as a [`MarketDataError`]. The quote
//! fetcher absorbs these at its boundary, so callers above it only ever see
//! a quote or nothing.

use thiserror::Error;

/// Errors that can occur while talking to an upstream quote provider.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider has no usable price history for the symbol.
    /// Not cached: the next request asks the provider again.
    #[error("No price history for {0}")]
    NoPriceHistory(String),

    /// A provider-specific error occurred.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider returned data that could not be turned into a quote.
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Description of the validation failure
        message: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// True when the provider simply had nothing for the symbol, as opposed
    /// to failing while trying.
    ///
    /// ```
    /// use nse_market_data::errors::MarketDataError;
    ///
    /// assert!(MarketDataError::NoPriceHistory("INFY.NS".into()).is_provider_miss());
    /// ```
    pub fn is_provider_miss(&self) -> bool {
        matches!(self, Self::NoPriceHistory(_))
    }
}
