//! Data models for quotes and API responses.

mod quote;
mod response;

pub use quote::{round2, IndexQuote, ProviderQuote, Quote, NOT_AVAILABLE};
pub use response::{AggregateResponse, MarketStatus, SearchResponse, StockResponse};
