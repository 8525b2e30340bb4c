//! Shaping of fetched quotes into the aggregate views.
//!
//! These are pure functions over whatever the fanout returned, so their
//! output order does not depend on fetch completion order (ties aside).

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use crate::models::{IndexQuote, Quote};
use crate::symbols::{index_name, MOVERS_LIMIT};

/// Largest movers first, up or down.
pub fn rank_by_abs_change(mut quotes: Vec<Quote>) -> Vec<Quote> {
    quotes.sort_by(|a, b| b.change_percent.abs().cmp(&a.change_percent.abs()));
    quotes
}

/// Positive movers, highest change percent first, at most [`MOVERS_LIMIT`].
pub fn top_gainers(quotes: Vec<Quote>) -> Vec<Quote> {
    let mut gainers: Vec<Quote> = quotes
        .into_iter()
        .filter(|q| q.change_percent > Decimal::ZERO)
        .collect();
    gainers.sort_by(|a, b| b.change_percent.cmp(&a.change_percent));
    gainers.truncate(MOVERS_LIMIT);
    gainers
}

/// Negative movers, most negative first, at most [`MOVERS_LIMIT`].
pub fn top_losers(quotes: Vec<Quote>) -> Vec<Quote> {
    let mut losers: Vec<Quote> = quotes
        .into_iter()
        .filter(|q| q.change_percent < Decimal::ZERO)
        .collect();
    losers.sort_by(|a, b| a.change_percent.cmp(&b.change_percent));
    losers.truncate(MOVERS_LIMIT);
    losers
}

/// Attach index display names; symbols outside the index table keep their symbol.
pub fn to_index_quotes<F>(quotes: Vec<Quote>, mut timestamp: F) -> Vec<IndexQuote>
where
    F: FnMut() -> DateTime<FixedOffset>,
{
    quotes
        .into_iter()
        .map(|q| IndexQuote {
            name: index_name(&q.symbol)
                .map(str::to_string)
                .unwrap_or_else(|| q.symbol.clone()),
            symbol: q.symbol,
            price: q.price,
            change: q.change,
            change_percent: q.change_percent,
            timestamp: timestamp(),
        })
        .collect()
}
