//! Static symbol universe served by the API (Yahoo Finance format).

/// NSE/BSE benchmark and sector indices as (display name, symbol).
pub const NSE_INDICES: [(&str, &str); 6] = [
    ("NIFTY 50", "^NSEI"),
    ("SENSEX", "^BSESN"),
    ("BANK NIFTY", "^NSEBANK"),
    ("NIFTY IT", "^CNXIT"),
    ("NIFTY PHARMA", "^CNXPHARMA"),
    ("NIFTY AUTO", "^CNXAUTO"),
];

/// Master list of large-cap NSE stocks. Views take prefixes of it.
pub const NIFTY_50_STOCKS: [&str; 30] = [
    "RELIANCE.NS",
    "TCS.NS",
    "HDFCBANK.NS",
    "INFY.NS",
    "ICICIBANK.NS",
    "HINDUNILVR.NS",
    "ITC.NS",
    "SBIN.NS",
    "BHARTIARTL.NS",
    "KOTAKBANK.NS",
    "LT.NS",
    "AXISBANK.NS",
    "ASIANPAINT.NS",
    "MARUTI.NS",
    "SUNPHARMA.NS",
    "TITAN.NS",
    "WIPRO.NS",
    "TATAMOTORS.NS",
    "BAJFINANCE.NS",
    "M&M.NS",
    "NESTLEIND.NS",
    "HCLTECH.NS",
    "ULTRACEMCO.NS",
    "ONGC.NS",
    "POWERGRID.NS",
    "NTPC.NS",
    "JSWSTEEL.NS",
    "TATASTEEL.NS",
    "ADANIENT.NS",
    "ADANIPORTS.NS",
];

/// Size of the snapshot shown by the stocks view.
pub const STOCKS_VIEW_SIZE: usize = 20;

/// Size of the universe gainers and losers are picked from.
pub const MOVERS_UNIVERSE_SIZE: usize = 30;

/// Maximum rows in the gainers and losers views.
pub const MOVERS_LIMIT: usize = 10;

/// Suffix appended to bare symbols on single stock lookups.
pub const DEFAULT_EXCHANGE_SUFFIX: &str = ".NS";

const KNOWN_EXCHANGE_SUFFIXES: [&str; 2] = [".NS", ".BO"];

/// Display name of an index symbol, if it is one of [`NSE_INDICES`].
pub fn index_name(symbol: &str) -> Option<&'static str> {
    NSE_INDICES
        .iter()
        .find(|(_, s)| *s == symbol)
        .map(|(name, _)| *name)
}

/// Qualify a bare symbol with the NSE suffix; `.NS` and `.BO` symbols pass through.
pub fn normalize_symbol(symbol: &str) -> String {
    if KNOWN_EXCHANGE_SUFFIXES
        .iter()
        .any(|suffix| symbol.ends_with(suffix))
    {
        symbol.to_string()
    } else {
        format!("{}{}", symbol, DEFAULT_EXCHANGE_SUFFIX)
    }
}

/// Master list symbols containing `query`, case-insensitively, in list order.
pub fn search_symbols(query: &str) -> Vec<&'static str> {
    let needle = query.to_uppercase();
    NIFTY_50_STOCKS
        .iter()
        .copied()
        .filter(|symbol| symbol.to_uppercase().contains(&needle))
        .collect()
}
