use chrono::{DateTime, FixedOffset};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// Placeholder used when the provider has no sector or industry.
pub const NOT_AVAILABLE: &str = "N/A";

/// Raw snapshot returned by an upstream provider for one symbol.
///
/// Everything except the current price is optional; the fetcher fills the
/// gaps with defaults when assembling a [`Quote`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProviderQuote {
    /// Latest close of the most recent daily bar
    pub price: f64,
    pub previous_close: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<u64>,
    pub market_cap: Option<u64>,
    /// Long display name
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
}

/// Market data quote served by the API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: Decimal,
    pub change: Decimal,
    pub change_percent: Decimal,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub volume: u64,
    pub market_cap: u64,
    pub sector: String,
    pub industry: String,
}

impl Quote {
    /// Build a quote from a provider snapshot.
    ///
    /// `change` is measured against the previous close, which defaults to the
    /// current price when the provider omits it. A zero previous close yields
    /// a change percent of zero rather than a division fault.
    pub fn from_provider(symbol: &str, raw: ProviderQuote) -> Result<Self, MarketDataError> {
        let price = round2(raw.price).ok_or_else(|| MarketDataError::ValidationFailed {
            message: format!("Invalid price {} for {}", raw.price, symbol),
        })?;

        let previous_close = raw.previous_close.unwrap_or(raw.price);
        let change = raw.price - previous_close;
        let change_percent = if previous_close != 0.0 && previous_close.is_finite() {
            change / previous_close * 100.0
        } else {
            0.0
        };

        Ok(Self {
            symbol: symbol.to_string(),
            name: raw.name.unwrap_or_else(|| symbol.to_string()),
            price,
            change: round2(change).unwrap_or(Decimal::ZERO),
            change_percent: round2(change_percent).unwrap_or(Decimal::ZERO),
            open: raw.open.and_then(round2),
            high: raw.high.and_then(round2),
            low: raw.low.and_then(round2),
            volume: raw.volume.unwrap_or(0),
            market_cap: raw.market_cap.unwrap_or(0),
            sector: raw.sector.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            industry: raw.industry.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        })
    }
}

/// One row of the indices view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexQuote {
    /// Human readable index name, e.g. "NIFTY 50"
    pub name: String,
    pub symbol: String,
    pub price: Decimal,
    pub change: Decimal,
    pub change_percent: Decimal,
    pub timestamp: DateTime<FixedOffset>,
}

/// Round to two decimal places, half to even. `None` for NaN or infinity.
///
/// Values that round to zero come back as positive zero.
pub fn round2(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    let rounded = Decimal::from_f64_retain(value)?.round_dp(2);
    Some(if rounded.is_zero() { Decimal::ZERO } else { rounded })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(price: f64, previous_close: Option<f64>) -> ProviderQuote {
        ProviderQuote {
            price,
            previous_close,
            ..Default::default()
        }
    }

    #[test]
    fn test_change_against_previous_close() {
        let raw = ProviderQuote {
            open: Some(1500.456),
            high: Some(1530.0),
            low: Some(1490.111),
            volume: Some(1_234_567),
            ..snapshot(1520.0, Some(1500.0))
        };
        let quote = Quote::from_provider("INFY.NS", raw).unwrap();
        assert_eq!(quote.price, dec!(1520.00));
        assert_eq!(quote.change, dec!(20.00));
        assert_eq!(quote.change_percent, dec!(1.33));
        assert_eq!(quote.open, Some(dec!(1500.46)));
        assert_eq!(quote.low, Some(dec!(1490.11)));
        assert_eq!(quote.volume, 1_234_567);
    }

    #[test]
    fn test_zero_previous_close_guard() {
        let quote = Quote::from_provider("ZERO.NS", snapshot(10.0, Some(0.0))).unwrap();
        assert_eq!(quote.change, dec!(10.00));
        assert_eq!(quote.change_percent, Decimal::ZERO);
    }

    #[test]
    fn test_missing_previous_close_means_no_change() {
        let quote = Quote::from_provider("TCS.NS", snapshot(3500.0, None)).unwrap();
        assert_eq!(quote.change, Decimal::ZERO);
        assert_eq!(quote.change_percent, Decimal::ZERO);
    }

    #[test]
    fn test_defaults_for_missing_profile() {
        let quote = Quote::from_provider("ITC.NS", snapshot(450.0, Some(440.0))).unwrap();
        assert_eq!(quote.name, "ITC.NS");
        assert_eq!(quote.sector, NOT_AVAILABLE);
        assert_eq!(quote.industry, NOT_AVAILABLE);
        assert_eq!(quote.market_cap, 0);
        assert_eq!(quote.volume, 0);
        assert!(quote.open.is_none());
    }

    #[test]
    fn test_nan_price_is_rejected() {
        let err = Quote::from_provider("BAD.NS", snapshot(f64::NAN, Some(1.0))).unwrap_err();
        assert!(matches!(err, MarketDataError::ValidationFailed { .. }));
    }

    #[test]
    fn test_serializes_camel_case_numbers() {
        let quote = Quote::from_provider("SBIN.NS", snapshot(800.5, Some(800.0))).unwrap();
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["changePercent"], serde_json::json!(0.06));
        assert_eq!(json["price"], serde_json::json!(800.5));
        assert_eq!(json["marketCap"], serde_json::json!(0));
        assert!(json["open"].is_null());
    }

    #[test]
    fn test_tiny_drop_rounds_to_positive_zero() {
        let pct = round2(-0.001).unwrap();
        assert!(pct.is_zero());
        assert!(pct.is_sign_positive());
    }
}
