//! Time-to-live key/value cache.
//!
//! Expiry is lazy: a stale entry stays in the map until it is overwritten,
//! read (which drops it), or swept by [`TtlCache::purge_expired`]. The map is
//! unbounded; the key space is a fixed symbol list plus a handful of views.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::clock::Clock;
use crate::models::{AggregateResponse, IndexQuote, Quote};

/// Default time-to-live applied to every key.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Everything the service keeps in its shared cache.
#[derive(Debug, Clone)]
pub enum CachedValue {
    /// Per-symbol quote, keyed by [`stock_key`]
    Quote(Quote),
    Indices(Arc<AggregateResponse<IndexQuote>>),
    Quotes(Arc<AggregateResponse<Quote>>),
}

/// The cache shared by the fetcher and every view.
pub type QuoteCache = TtlCache<CachedValue>;

/// Cache key of a single symbol's quote.
pub fn stock_key(symbol: &str) -> String {
    format!("stock_{}", symbol)
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

/// Thread-safe string-keyed cache with a single TTL for all keys.
///
/// The lock is held only for the map operation itself; callers build values
/// before calling [`put`](Self::put).
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Lock the entries mutex, recovering from poison if necessary.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn is_fresh(&self, entry: &CacheEntry<V>, now: DateTime<Utc>) -> bool {
        // An entry stamped in the future (clock moved back) counts as just stored
        let age = (now - entry.stored_at).to_std().unwrap_or(Duration::ZERO);
        age < self.ttl
    }

    /// Returns the value for `key` if it was stored less than one TTL ago.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.lock_entries();
        let entry = entries.get(key)?;
        if self.is_fresh(entry, now) {
            return Some(entry.value.clone());
        }
        entries.remove(key);
        None
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let entry = CacheEntry {
            value,
            stored_at: self.clock.now(),
        };
        self.lock_entries().insert(key.into(), entry);
    }

    /// Number of entries that are still fresh.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.lock_entries()
            .values()
            .filter(|entry| self.is_fresh(entry, now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock_entries();
        let before = entries.len();
        entries.retain(|_, entry| self.is_fresh(entry, now));
        before - entries.len()
    }
}
