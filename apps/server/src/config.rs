use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
    pub fanout_concurrency: usize,
    /// Upper bound on a single upstream quote call
    pub fetch_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(30_000),
            cache_ttl: Duration::from_secs(60),
            fanout_concurrency: 10,
            fetch_timeout: Duration::from_millis(5_000),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr = match std::env::var("NSE_LISTEN_ADDR") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("Invalid NSE_LISTEN_ADDR: {}", raw))?,
            Err(_) => defaults.listen_addr,
        };
        let cors_allow = std::env::var("NSE_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = env_or("NSE_REQUEST_TIMEOUT_MS", 30_000);
        let ttl_secs: u64 = env_or("NSE_CACHE_TTL_SECS", defaults.cache_ttl.as_secs());
        let fanout_concurrency = env_or("NSE_FANOUT_CONCURRENCY", defaults.fanout_concurrency);
        let fetch_timeout_ms: u64 = env_or("NSE_FETCH_TIMEOUT_MS", 5_000);

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            cache_ttl: Duration::from_secs(ttl_secs),
            fanout_concurrency,
            fetch_timeout: Duration::from_millis(fetch_timeout_ms),
        })
    }
}

/// Parse `key` from the environment, falling back on absence or parse failure.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    let Ok(raw) = std::env::var(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!("Invalid {}={:?}, using default", key, raw);
            default
        }
    }
}
