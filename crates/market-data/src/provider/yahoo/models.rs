//! Yahoo Finance quoteSummary response models.
//!
//! Only the fields the quote view needs are modelled: previous close,
//! names, sector/industry and market capitalisation.

use serde::Deserialize;

/// Main response wrapper for quoteSummary API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteSummaryResponse {
    pub quote_summary: YahooQuoteSummary,
}

#[derive(Debug, Deserialize)]
pub struct YahooQuoteSummary {
    /// `null` when the symbol is unknown
    #[serde(default)]
    pub result: Option<Vec<YahooQuoteSummaryResult>>,
}

/// Individual result from quoteSummary API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteSummaryResult {
    pub price: Option<YahooPriceData>,
    pub summary_profile: Option<YahooSummaryProfile>,
    pub summary_detail: Option<YahooSummaryDetail>,
}

/// `price` module
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooPriceData {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub regular_market_previous_close: Option<YahooPriceDetail>,
    pub market_cap: Option<YahooPriceDetail>,
}

/// Numeric value as `{"raw": 123.45, "fmt": "123.45"}`, or `{}` when absent.
#[derive(Debug, Deserialize, Clone)]
pub struct YahooPriceDetail {
    pub raw: Option<f64>,
}

/// `summaryProfile` module
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooSummaryProfile {
    pub sector: Option<String>,
    pub industry: Option<String>,
}

/// `summaryDetail` module
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooSummaryDetail {
    pub previous_close: Option<YahooPriceDetail>,
    pub market_cap: Option<YahooPriceDetail>,
}

impl YahooQuoteSummaryResult {
    /// Previous close, preferring `summaryDetail` over the `price` module.
    pub fn previous_close(&self) -> Option<f64> {
        self.summary_detail
            .as_ref()
            .and_then(|d| d.previous_close.as_ref())
            .and_then(|p| p.raw)
            .or_else(|| {
                self.price
                    .as_ref()
                    .and_then(|p| p.regular_market_previous_close.as_ref())
                    .and_then(|p| p.raw)
            })
    }

    pub fn market_cap(&self) -> Option<u64> {
        self.summary_detail
            .as_ref()
            .and_then(|d| d.market_cap.as_ref())
            .and_then(|p| p.raw)
            .or_else(|| {
                self.price
                    .as_ref()
                    .and_then(|p| p.market_cap.as_ref())
                    .and_then(|p| p.raw)
            })
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as u64)
    }

    pub fn long_name(&self) -> Option<String> {
        let price = self.price.as_ref()?;
        price
            .long_name
            .clone()
            .or_else(|| price.short_name.clone())
            .map(|n| n.replace("&amp;", "&"))
            .filter(|n| !n.is_empty())
    }
}
