use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single daily OHLCV bar for one ticker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceBar {
    /// Trading day
    pub date: NaiveDate,
    /// Opening price
    pub open: f64,
    /// Daily high
    pub high: f64,
    /// Daily low
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Split/dividend adjusted close
    pub adj_close: f64,
    /// Shares traded
    pub volume: u64,
}

/// Daily price history for a single ticker.
///
/// Bars are strictly ascending by date with no duplicates; the invariant is
/// enforced by [`PriceSeries::from_bars`], the only way to build one.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Normalizes raw bars into a series: sorts ascending by date and
    /// collapses duplicate dates, keeping the bar seen last.
    pub fn from_bars(ticker: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|bar| bar.date);
        // dedup_by removes the *later* element of a pair, so reverse the
        // pair order to keep the last-seen bar for a date.
        bars.dedup_by(|next, prev| {
            if next.date == prev.date {
                *prev = *next;
                true
            } else {
                false
            }
        });
        Self {
            ticker: ticker.into(),
            bars,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|bar| bar.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|bar| bar.date)
    }

    /// Last `n` bars, oldest first.
    pub fn tail(&self, n: usize) -> Vec<PriceBar> {
        let start = self.bars.len().saturating_sub(n);
        self.bars[start..].to_vec()
    }

    /// Projects the series into the forecasting model's (ds, y) schema,
    /// using the closing price as the regressed value.
    pub fn to_training_frame(&self) -> TrainingFrame {
        TrainingFrame {
            ds: self.bars.iter().map(|bar| bar.date).collect(),
            y: self.bars.iter().map(|bar| bar.close).collect(),
        }
    }
}

/// Two-column (date, value) training set consumed by the forecast engine.
/// Derived from a [`PriceSeries`], never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrainingFrame {
    /// Observation dates, ascending
    pub ds: Vec<NaiveDate>,
    /// Observed values (closing prices)
    pub y: Vec<f64>,
}

impl TrainingFrame {
    pub fn len(&self) -> usize {
        self.ds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ds.is_empty()
    }
}
