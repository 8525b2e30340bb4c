use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::quote::Quote;

/// Envelope shared by every list view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateResponse<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
    pub timestamp: DateTime<FixedOffset>,
}

impl<T> AggregateResponse<T> {
    pub fn new(data: Vec<T>, timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
            timestamp,
        }
    }
}

/// Single stock lookup result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockResponse {
    pub success: bool,
    pub data: Quote,
    pub timestamp: DateTime<FixedOffset>,
}

/// Search result. Carries the normalized (uppercased) query, no timestamp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    pub count: usize,
    pub data: Vec<Quote>,
}

/// Trading session state of the exchange.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStatus {
    pub is_open: bool,
    pub timestamp: DateTime<FixedOffset>,
    /// Full English weekday name in exchange local time
    pub day: String,
    pub message: String,
}
