use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One forecast row: point prediction, confidence bounds and the additive
/// components it decomposes into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastPoint {
    /// Date the prediction applies to
    pub ds: NaiveDate,
    /// Point prediction
    pub yhat: f64,
    /// Lower confidence bound
    pub yhat_lower: f64,
    /// Upper confidence bound
    pub yhat_upper: f64,
    /// Trend component
    pub trend: f64,
    /// Weekly seasonality component
    pub weekly: f64,
    /// Yearly seasonality component
    pub yearly: f64,
}

/// Forecast over the historical range plus the requested future horizon,
/// ascending by date. Recomputed from scratch on every parameter change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastSeries {
    points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    pub fn new(points: Vec<ForecastPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.ds)
    }

    /// Last `n` rows, oldest first.
    pub fn tail(&self, n: usize) -> Vec<ForecastPoint> {
        let start = self.points.len().saturating_sub(n);
        self.points[start..].to_vec()
    }

    /// Rows strictly after `date` (the future part of the forecast).
    pub fn points_after(&self, date: NaiveDate) -> Vec<ForecastPoint> {
        self.points.iter().copied().filter(|p| p.ds > date).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(d: u32) -> ForecastPoint {
        ForecastPoint {
            ds: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
            yhat: d as f64,
            yhat_lower: d as f64 - 1.0,
            yhat_upper: d as f64 + 1.0,
            trend: d as f64,
            weekly: 0.0,
            yearly: 0.0,
        }
    }

    #[test]
    fn tail_and_last_date() {
        let series = ForecastSeries::new((1..=8).map(point).collect());
        assert_eq!(series.tail(5).len(), 5);
        assert_eq!(
            series.last_date(),
            Some(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap())
        );
    }

    #[test]
    fn points_after_splits_history_from_future() {
        let series = ForecastSeries::new((1..=8).map(point).collect());
        let cut = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let future = series.points_after(cut);
        assert_eq!(future.len(), 3);
        assert!(future.iter().all(|p| p.ds > cut));
    }
}
