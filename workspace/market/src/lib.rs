//! Market-data loading: fetches daily OHLCV history for a ticker from the
//! Yahoo Finance chart API and normalizes it into a [`common::PriceSeries`].

pub mod error;
pub mod yahoo;

pub use error::{MarketError, Result};
pub use yahoo::YahooFinanceClient;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::PriceSeries;

/// Source of daily price history. The production implementation talks to
/// Yahoo Finance; tests substitute an in-memory double.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetches daily bars for `ticker` over `[start, end]`, inclusive.
    ///
    /// Returns [`MarketError::DataUnavailable`] when the provider is
    /// unreachable or answers with no rows, so callers can surface a
    /// recoverable error instead of rendering from an empty series.
    async fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries>;

    /// Short human-readable label for health reporting.
    fn source_label(&self) -> &str;
}
