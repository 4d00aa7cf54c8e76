//! Client for the Yahoo Finance v8 chart endpoint.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate};
use common::{PriceBar, PriceSeries};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, instrument};

use crate::MarketDataSource;
use crate::error::{MarketError, Result};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Fetches daily price history from Yahoo Finance.
///
/// Time taken: tens of milliseconds per ticker; results are cached by the
/// caller, one network call per distinct ticker per cache lifetime.
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

impl YahooFinanceClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Points the client at a different host, used to target a stub server
    /// in tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn chart_url(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
        let period1 = start
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0);
        // period2 is exclusive upstream, so push it past the end date to
        // keep the range inclusive.
        let period2 = (end + Duration::days(1))
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0);
        format!(
            "{}/v8/finance/chart/{ticker}?symbol={ticker}&period1={period1}&period2={period2}&interval=1d&events=div|split|capitalGains",
            self.base_url
        )
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    #[instrument(skip(self))]
    async fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        let tckr = ticker.to_uppercase();
        let url = self.chart_url(&tckr, start, end);

        let response: ChartEnvelope = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| {
                error!("[{tckr}] failed to fetch price response | ERROR: {e} | URL: {url}");
                MarketError::unavailable(&tckr, e.to_string())
            })?
            .error_for_status()
            .map_err(|e| {
                error!("[{tckr}] provider answered with error status | ERROR: {e} | URL: {url}");
                MarketError::unavailable(&tckr, e.to_string())
            })?
            .json()
            .await
            .map_err(|e| {
                error!("[{tckr}] failed to decode price response | ERROR: {e} | URL: {url}");
                MarketError::decode(&tckr, e.to_string())
            })?;

        let series = normalize(&tckr, response)?;
        if series.is_empty() {
            return Err(MarketError::unavailable(&tckr, "provider returned no rows"));
        }
        debug!(rows = series.len(), "price history fetched for [{tckr}]");
        Ok(series)
    }

    fn source_label(&self) -> &str {
        "yahoo-finance"
    }
}

/// Zips the chart payload's parallel timestamp/quote arrays into bars,
/// skipping rows the provider nulled out (holidays, halted sessions), and
/// normalizes them into a sorted, deduplicated series.
fn normalize(ticker: &str, payload: ChartEnvelope) -> Result<PriceSeries> {
    let upstream_error = payload
        .chart
        .error
        .map(|e| format!("{}: {}", e.code, e.description));
    let data = payload
        .chart
        .result
        .and_then(|mut results| {
            if results.is_empty() {
                None
            } else {
                Some(results.remove(0))
            }
        })
        .ok_or_else(|| {
            MarketError::unavailable(
                ticker,
                upstream_error.unwrap_or_else(|| "empty chart result".to_string()),
            )
        })?;

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| MarketError::decode(ticker, "missing quote block"))?;
    let adjclose = data
        .indicators
        .adjclose
        .and_then(|blocks| blocks.into_iter().next());

    let mut bars = Vec::with_capacity(data.timestamp.len());
    for (i, ts) in data.timestamp.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close)) = (
            cell(&quote.open, i),
            cell(&quote.high, i),
            cell(&quote.low, i),
            cell(&quote.close, i),
        ) else {
            continue;
        };
        let Some(date) = DateTime::from_timestamp(*ts, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        let adj_close = adjclose
            .as_ref()
            .and_then(|a| cell(&a.adjclose, i))
            .unwrap_or(close);
        let volume = quote.volume.get(i).copied().flatten().unwrap_or(0);

        bars.push(PriceBar {
            date,
            open,
            high,
            low,
            close,
            adj_close,
            volume,
        });
    }

    Ok(PriceSeries::from_bars(ticker, bars))
}

fn cell(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten()
}

// >> Input: Yahoo Finance chart payload
// ==========================================================================
#[derive(Deserialize, Debug)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Deserialize, Debug)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Deserialize, Debug)]
struct AdjClose {
    adjclose: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trimmed-down chart payload: three trading days, the middle one
    // nulled out by the provider.
    const PAYLOAD: &str = r#"{
        "chart": {
            "result": [{
                "timestamp": [1704153600, 1704240000, 1704326400],
                "indicators": {
                    "quote": [{
                        "open": [185.0, null, 187.0],
                        "high": [186.5, null, 188.2],
                        "low": [184.1, null, 186.0],
                        "close": [186.0, null, 187.5],
                        "volume": [52000000, null, 48000000]
                    }],
                    "adjclose": [{
                        "adjclose": [185.7, null, 187.2]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn normalize_skips_null_rows() {
        let payload: ChartEnvelope = serde_json::from_str(PAYLOAD).unwrap();
        let series = normalize("AAPL", payload).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].close, 186.0);
        assert_eq!(series.bars()[0].adj_close, 185.7);
        assert_eq!(series.bars()[1].volume, 48_000_000);
    }

    #[test]
    fn normalize_converts_timestamps_to_dates_in_order() {
        let payload: ChartEnvelope = serde_json::from_str(PAYLOAD).unwrap();
        let series = normalize("AAPL", payload).unwrap();
        let dates: Vec<_> = series.bars().iter().map(|b| b.date).collect();
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(
            series.first_date(),
            chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        );
    }

    #[test]
    fn normalize_reports_upstream_error() {
        let payload: ChartEnvelope = serde_json::from_str(
            r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#,
        )
        .unwrap();
        let err = normalize("ZZZZ", payload).unwrap_err();
        match err {
            MarketError::DataUnavailable { ticker, reason } => {
                assert_eq!(ticker, "ZZZZ");
                assert!(reason.contains("No data found"));
            }
            other => panic!("expected DataUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn normalize_falls_back_to_close_without_adjclose() {
        let payload: ChartEnvelope = serde_json::from_str(
            r#"{
                "chart": {
                    "result": [{
                        "timestamp": [1704153600],
                        "indicators": {
                            "quote": [{
                                "open": [10.0], "high": [11.0], "low": [9.0],
                                "close": [10.5], "volume": [100]
                            }]
                        }
                    }],
                    "error": null
                }
            }"#,
        )
        .unwrap();
        let series = normalize("GME", payload).unwrap();
        assert_eq!(series.bars()[0].adj_close, 10.5);
    }

    #[test]
    fn chart_url_spans_requested_range() {
        let client = YahooFinanceClient::with_base_url("http://localhost:9");
        let url = client.chart_url(
            "AAPL",
            chrono::NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(1970, 1, 2).unwrap(),
        );
        assert!(url.contains("/v8/finance/chart/AAPL"));
        assert!(url.contains("period1=0"));
        assert!(url.contains("period2=172800"));
        assert!(url.contains("interval=1d"));
    }
}
