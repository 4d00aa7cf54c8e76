#[cfg(test)]
pub mod test_utils {
    use crate::config::{AppConfig, DEFAULT_TICKERS};
    use crate::router::create_router;
    use crate::schemas::AppState;
    use async_trait::async_trait;
    use axum::Router;
    use chrono::{Datelike, Duration, NaiveDate};
    use common::{PriceBar, PriceSeries};
    use market::{MarketDataSource, MarketError};
    use moka::future::Cache;
    use std::collections::HashMap;
    use std::f64::consts::PI;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    /// In-memory market-data double with a fetch counter, so tests can
    /// assert on cache behavior without any network.
    pub struct StubMarket {
        series: HashMap<String, PriceSeries>,
        fail: bool,
        fetches: AtomicUsize,
    }

    impl StubMarket {
        /// Two years of synthetic history for each default ticker.
        pub fn with_default_tickers() -> Self {
            let series = DEFAULT_TICKERS
                .iter()
                .map(|t| (t.to_string(), synthetic_series(t, 730)))
                .collect();
            Self {
                series,
                fail: false,
                fetches: AtomicUsize::new(0),
            }
        }

        /// Serves exactly the given series.
        pub fn with_series(series: HashMap<String, PriceSeries>) -> Self {
            Self {
                series,
                fail: false,
                fetches: AtomicUsize::new(0),
            }
        }

        /// Fails every fetch, simulating an unreachable provider.
        pub fn failing() -> Self {
            Self {
                series: HashMap::new(),
                fail: true,
                fetches: AtomicUsize::new(0),
            }
        }

        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketDataSource for StubMarket {
        async fn fetch_daily(
            &self,
            ticker: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> market::Result<PriceSeries> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(MarketError::unavailable(ticker, "stubbed outage"));
            }
            self.series
                .get(ticker)
                .cloned()
                .ok_or_else(|| MarketError::unavailable(ticker, "no stub data"))
        }

        fn source_label(&self) -> &str {
            "stub-market"
        }
    }

    /// Deterministic daily series: gentle trend plus a weekly wiggle.
    pub fn synthetic_series(ticker: &str, days: usize) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).expect("valid date");
        let bars = (0..days)
            .map(|i| {
                let date = start + Duration::days(i as i64);
                let weekday = date.weekday().num_days_from_monday() as f64;
                let close = 100.0 + 0.05 * i as f64 + 2.0 * (2.0 * PI * weekday / 7.0).sin();
                PriceBar {
                    date,
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    adj_close: close,
                    volume: 1_000_000 + i as u64,
                }
            })
            .collect();
        PriceSeries::from_bars(ticker, bars)
    }

    /// Create AppState for testing, backed by a stub market.
    pub fn setup_test_app_state() -> (AppState, Arc<StubMarket>) {
        setup_state_with_market(Arc::new(StubMarket::with_default_tickers()))
    }

    pub fn setup_state_with_market(market: Arc<StubMarket>) -> (AppState, Arc<StubMarket>) {
        let dyn_market: Arc<dyn MarketDataSource> = market.clone();
        let state = AppState {
            market: dyn_market,
            cache: Cache::new(100),
            config: Arc::new(AppConfig::default()),
            generation: Arc::new(AtomicU64::new(0)),
        };
        (state, market)
    }

    /// Create axum app for testing
    pub fn setup_test_app() -> (Router, Arc<StubMarket>) {
        let (state, market) = setup_test_app_state();
        (create_router(state), market)
    }

    /// Create axum app backed by a specific stub market.
    pub fn setup_test_app_with(market: StubMarket) -> (Router, Arc<StubMarket>) {
        let (state, market) = setup_state_with_market(Arc::new(market));
        (create_router(state), market)
    }
}
