pub mod additive;
pub mod error;
mod solver;

pub use additive::{AdditiveModel, FittedModel};
pub use error::{ComputeError, Result};

use common::{ForecastSeries, TrainingFrame};

/// Fits the default additive model and extends the series `horizon_days`
/// past the last observation, the way most callers use this crate: one
/// fresh fit per invocation, nothing cached.
pub fn forecast_with_defaults(
    frame: &TrainingFrame,
    horizon_days: i64,
) -> Result<ForecastSeries> {
    let fitted = AdditiveModel::default().fit(frame)?;
    let dates = fitted.make_future_dates(horizon_days);
    Ok(fitted.predict(&dates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn forecast_with_defaults_spans_history_plus_horizon() {
        let start = NaiveDate::from_ymd_opt(2022, 6, 1).unwrap();
        let frame = TrainingFrame {
            ds: (0..100).map(|i| start + Duration::days(i)).collect(),
            y: (0..100).map(|i| 30.0 + i as f64 * 0.2).collect(),
        };

        let forecast = forecast_with_defaults(&frame, 365).unwrap();
        assert_eq!(forecast.len(), 100 + 365);
        assert_eq!(
            forecast.last_date(),
            Some(*frame.ds.last().unwrap() + Duration::days(365))
        );
    }
}
