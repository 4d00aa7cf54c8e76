use chrono::NaiveDate;
use market::{MarketDataSource, YahooFinanceClient};
use moka::future::Cache;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Duration;

use crate::schemas::AppState;

/// Default ticker set offered by the dashboard.
pub const DEFAULT_TICKERS: [&str; 6] = ["GOOG", "AAPL", "MSFT", "GME", "TSLA", "NVDA"];

/// History always starts here; the end of the range is always today.
pub const HISTORY_START: &str = "1970-01-01";

/// Runtime configuration, read from the environment with sensible defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Tickers the dashboard offers
    pub tickers: Vec<String>,
    /// Smallest selectable horizon, in years
    pub min_horizon_years: u32,
    /// Largest selectable horizon, in years
    pub max_horizon_years: u32,
    /// First date of the requested history range
    pub history_start: NaiveDate,
    /// How long a fetched price series stays cached
    pub cache_ttl: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tickers: DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
            min_horizon_years: 1,
            max_horizon_years: 10,
            history_start: HISTORY_START.parse().unwrap_or(NaiveDate::MIN),
            cache_ttl: Duration::from_secs(300),
        }
    }
}

impl AppConfig {
    /// Reads configuration from `STOCKCAST_*` environment variables,
    /// falling back to the defaults above.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(tickers) = std::env::var("STOCKCAST_TICKERS") {
            let parsed: Vec<String> = tickers
                .split(',')
                .map(|t| t.trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect();
            if !parsed.is_empty() {
                config.tickers = parsed;
            }
        }
        if let Some(max) = env_parse("STOCKCAST_MAX_HORIZON_YEARS") {
            config.max_horizon_years = max;
        }
        if let Some(secs) = env_parse("STOCKCAST_CACHE_TTL_SECS") {
            config.cache_ttl = Duration::from_secs(secs);
        }
        config
    }

    pub fn is_known_ticker(&self, ticker: &str) -> bool {
        self.tickers.iter().any(|t| t == ticker)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Initialize application configuration and state
pub fn initialize_app_state() -> AppState {
    let config = AppConfig::from_env();

    let market: Arc<dyn MarketDataSource> = match std::env::var("STOCKCAST_YAHOO_BASE_URL") {
        Ok(base_url) => Arc::new(YahooFinanceClient::with_base_url(base_url)),
        Err(_) => Arc::new(YahooFinanceClient::new()),
    };

    // One entry per ticker; TTL bounds how long a series is served without
    // a fresh upstream fetch.
    let cache = Cache::builder()
        .max_capacity(64)
        .time_to_live(config.cache_ttl)
        .build();

    AppState {
        market,
        cache,
        config: Arc::new(config),
        generation: Arc::new(AtomicU64::new(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_canonical_dashboard() {
        let config = AppConfig::default();
        assert_eq!(config.tickers.len(), 6);
        assert!(config.is_known_ticker("AAPL"));
        assert!(!config.is_known_ticker("ZZZZ"));
        assert_eq!(config.min_horizon_years, 1);
        assert_eq!(config.max_horizon_years, 10);
        assert_eq!(
            config.history_start,
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
        );
    }
}
