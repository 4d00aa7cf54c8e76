//! Additive regression forecaster: a linear trend plus truncated Fourier
//! weekly and yearly seasonalities, fit by ridge-stabilized least squares
//! on a (ds, y) training frame.

use chrono::{Datelike, Duration, NaiveDate};
use common::{ForecastPoint, ForecastSeries, TrainingFrame};
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;
use tracing::{debug, instrument};

use crate::error::{ComputeError, Result};
use crate::solver;

const WEEKLY_PERIOD: f64 = 7.0;
const YEARLY_PERIOD: f64 = 365.25;

/// Model configuration. [`AdditiveModel::default`] matches the defaults of
/// the usual additive forecasting libraries: weekly Fourier order 3,
/// yearly order 10, 80% confidence interval.
#[derive(Debug, Clone)]
pub struct AdditiveModel {
    weekly_order: usize,
    yearly_order: usize,
    interval_width: f64,
    ridge: f64,
}

impl Default for AdditiveModel {
    fn default() -> Self {
        Self {
            weekly_order: 3,
            yearly_order: 10,
            interval_width: 0.8,
            ridge: 1e-4,
        }
    }
}

impl AdditiveModel {
    pub fn new(weekly_order: usize, yearly_order: usize, interval_width: f64) -> Self {
        Self {
            weekly_order,
            yearly_order,
            interval_width,
            ..Self::default()
        }
    }

    fn n_features(&self) -> usize {
        2 + 2 * self.weekly_order + 2 * self.yearly_order
    }

    /// Fits the model to a training frame.
    ///
    /// Rows with a non-finite `y` are dropped first; at least two distinct
    /// dates must survive or the frame is rejected as degenerate.
    #[instrument(skip(self, frame), fields(rows = frame.len()))]
    pub fn fit(&self, frame: &TrainingFrame) -> Result<FittedModel> {
        let rows: Vec<(NaiveDate, f64)> = frame
            .ds
            .iter()
            .copied()
            .zip(frame.y.iter().copied())
            .filter(|(_, y)| y.is_finite())
            .collect();

        let n = rows.len();
        if n < 2 || rows.first().map(|r| r.0) == rows.last().map(|r| r.0) {
            return Err(ComputeError::InsufficientHistory(format!(
                "need at least 2 usable observations on distinct dates, got {n}"
            )));
        }

        let first_date = rows[0].0;
        let last_date = rows[n - 1].0;
        let span_days = ((last_date - first_date).num_days() as f64).max(1.0);

        let basis = FeatureBasis {
            weekly_order: self.weekly_order,
            yearly_order: self.yearly_order,
            first_date,
            span_days,
        };

        // Normal equations XtX * c = Xty with a ridge term on the diagonal
        // so short histories stay solvable.
        let p = self.n_features();
        let mut xtx = vec![vec![0.0; p]; p];
        let mut xty = vec![0.0; p];
        for (ds, y) in &rows {
            let x = basis.features(*ds);
            for i in 0..p {
                xty[i] += x[i] * y;
                for j in 0..p {
                    xtx[i][j] += x[i] * x[j];
                }
            }
        }
        for (i, row) in xtx.iter_mut().enumerate() {
            row[i] += self.ridge;
        }

        let coefficients = solver::solve(xtx, xty).ok_or_else(|| {
            ComputeError::ModelFitFailure("singular or non-finite normal equations".to_string())
        })?;

        // Residual spread drives the confidence band width.
        let mut sq_sum = 0.0;
        for (ds, y) in &rows {
            let x = basis.features(*ds);
            let yhat: f64 = x.iter().zip(&coefficients).map(|(a, b)| a * b).sum();
            let r = y - yhat;
            sq_sum += r * r;
        }
        let sigma = (sq_sum / (n as f64 - 1.0).max(1.0)).sqrt();
        if !sigma.is_finite() {
            return Err(ComputeError::ModelFitFailure(
                "non-finite residual variance".to_string(),
            ));
        }

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ComputeError::ModelFitFailure(e.to_string()))?;
        let z = normal.inverse_cdf(0.5 + self.interval_width / 2.0);

        debug!(n, sigma, "additive model fitted");

        Ok(FittedModel {
            basis,
            coefficients,
            weekly_order: self.weekly_order,
            sigma,
            z,
            n_train: n,
            train_dates: rows.into_iter().map(|(ds, _)| ds).collect(),
            last_train_date: last_date,
        })
    }
}

/// A fitted additive model, ready to predict.
#[derive(Debug, Clone)]
pub struct FittedModel {
    basis: FeatureBasis,
    coefficients: Vec<f64>,
    weekly_order: usize,
    sigma: f64,
    z: f64,
    n_train: usize,
    train_dates: Vec<NaiveDate>,
    last_train_date: NaiveDate,
}

impl FittedModel {
    pub fn last_train_date(&self) -> NaiveDate {
        self.last_train_date
    }

    /// The training dates followed by `horizon_days` consecutive calendar
    /// days after the last observation.
    pub fn make_future_dates(&self, horizon_days: i64) -> Vec<NaiveDate> {
        let mut dates = self.train_dates.clone();
        dates.extend(
            (1..=horizon_days.max(0)).map(|offset| self.last_train_date + Duration::days(offset)),
        );
        dates
    }

    /// Predicts each requested date, with confidence bounds and the trend /
    /// weekly / yearly decomposition.
    pub fn predict(&self, dates: &[NaiveDate]) -> ForecastSeries {
        let points = dates
            .iter()
            .map(|&ds| {
                let (trend, weekly, yearly) = self.components(ds);
                let yhat = trend + weekly + yearly;

                // Uncertainty grows past the training window.
                let days_out = (ds - self.last_train_date).num_days().max(0) as f64;
                let half_width =
                    self.z * self.sigma * (1.0 + days_out / self.n_train as f64).sqrt();

                ForecastPoint {
                    ds,
                    yhat,
                    yhat_lower: yhat - half_width,
                    yhat_upper: yhat + half_width,
                    trend,
                    weekly,
                    yearly,
                }
            })
            .collect();
        ForecastSeries::new(points)
    }

    fn components(&self, ds: NaiveDate) -> (f64, f64, f64) {
        let x = self.basis.features(ds);
        let weekly_end = 2 + 2 * self.weekly_order;
        let dot = |range: std::ops::Range<usize>| -> f64 {
            range.map(|i| x[i] * self.coefficients[i]).sum()
        };
        let trend = dot(0..2);
        let weekly = dot(2..weekly_end);
        let yearly = dot(weekly_end..x.len());
        (trend, weekly, yearly)
    }
}

/// Maps a calendar date onto the regression features: intercept, scaled
/// time, and sin/cos pairs per seasonal harmonic. Seasonal phases use the
/// absolute day number so weekday alignment survives any date range.
#[derive(Debug, Clone)]
struct FeatureBasis {
    weekly_order: usize,
    yearly_order: usize,
    first_date: NaiveDate,
    span_days: f64,
}

impl FeatureBasis {
    fn features(&self, ds: NaiveDate) -> Vec<f64> {
        let mut x = Vec::with_capacity(2 + 2 * self.weekly_order + 2 * self.yearly_order);
        let t = (ds - self.first_date).num_days() as f64 / self.span_days;
        x.push(1.0);
        x.push(t);

        let day = ds.num_days_from_ce() as f64;
        for k in 1..=self.weekly_order {
            let angle = 2.0 * PI * k as f64 * day / WEEKLY_PERIOD;
            x.push(angle.sin());
            x.push(angle.cos());
        }
        for k in 1..=self.yearly_order {
            let angle = 2.0 * PI * k as f64 * day / YEARLY_PERIOD;
            x.push(angle.sin());
            x.push(angle.cos());
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn frame_from<F: Fn(usize) -> f64>(start: NaiveDate, days: usize, f: F) -> TrainingFrame {
        let ds: Vec<NaiveDate> = (0..days).map(|i| start + Duration::days(i as i64)).collect();
        let y: Vec<f64> = (0..days).map(f).collect();
        TrainingFrame { ds, y }
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
    }

    #[test]
    fn fit_recovers_linear_trend() {
        let frame = frame_from(start(), 400, |i| 50.0 + 0.25 * i as f64);
        let fitted = AdditiveModel::default().fit(&frame).unwrap();

        let dates = fitted.make_future_dates(30);
        let forecast = fitted.predict(&dates);
        let last = forecast.points().last().unwrap();
        let expected = 50.0 + 0.25 * (400.0 - 1.0 + 30.0);
        assert!(
            (last.yhat - expected).abs() < expected * 0.05,
            "yhat {} too far from {}",
            last.yhat,
            expected
        );
    }

    #[test]
    fn fit_captures_weekly_pattern() {
        let pattern = [0.0, 1.0, 2.0, 3.0, 2.0, 1.0, 0.0];
        let frame = frame_from(start(), 210, |i| {
            20.0 + pattern[(start() + Duration::days(i as i64))
                .weekday()
                .num_days_from_monday() as usize]
        });
        let fitted = AdditiveModel::default().fit(&frame).unwrap();
        let forecast = fitted.predict(&frame.ds);

        for (point, y) in forecast.points().iter().zip(&frame.y) {
            assert!(
                (point.yhat - y).abs() < 0.5,
                "prediction {} misses observed {} at {}",
                point.yhat,
                y,
                point.ds
            );
        }
    }

    #[rstest]
    #[case(365)]
    #[case(3650)]
    fn future_dates_extend_exactly_past_history(#[case] horizon: i64) {
        let frame = frame_from(start(), 120, |i| i as f64);
        let fitted = AdditiveModel::default().fit(&frame).unwrap();

        let dates = fitted.make_future_dates(horizon);
        assert_eq!(dates.len(), 120 + horizon as usize);
        assert_eq!(
            *dates.last().unwrap(),
            fitted.last_train_date() + Duration::days(horizon)
        );
    }

    #[test]
    fn bounds_bracket_prediction_and_widen_into_future() {
        let frame = frame_from(start(), 300, |i| {
            100.0 + 0.1 * i as f64 + if i % 2 == 0 { 1.0 } else { -1.0 }
        });
        let fitted = AdditiveModel::default().fit(&frame).unwrap();
        let forecast = fitted.predict(&fitted.make_future_dates(365));

        for point in forecast.points() {
            assert!(point.yhat_lower <= point.yhat && point.yhat <= point.yhat_upper);
        }

        let in_sample_width = {
            let p = &forecast.points()[0];
            p.yhat_upper - p.yhat_lower
        };
        let future_width = {
            let p = forecast.points().last().unwrap();
            p.yhat_upper - p.yhat_lower
        };
        assert!(future_width > in_sample_width);
    }

    #[test]
    fn decomposition_sums_to_prediction() {
        let frame = frame_from(start(), 250, |i| 10.0 + (i as f64 * 0.3).sin());
        let fitted = AdditiveModel::default().fit(&frame).unwrap();
        let forecast = fitted.predict(&fitted.make_future_dates(10));

        for point in forecast.points() {
            let sum = point.trend + point.weekly + point.yearly;
            assert!((point.yhat - sum).abs() < 1e-9);
        }
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    fn too_few_rows_is_insufficient_history(#[case] rows: usize) {
        let frame = frame_from(start(), rows, |i| i as f64);
        let err = AdditiveModel::default().fit(&frame).unwrap_err();
        assert!(matches!(err, ComputeError::InsufficientHistory(_)));
    }

    #[test]
    fn non_finite_rows_are_dropped_before_counting() {
        let frame = TrainingFrame {
            ds: vec![start(), start() + Duration::days(1), start() + Duration::days(2)],
            y: vec![f64::NAN, f64::INFINITY, 1.0],
        };
        let err = AdditiveModel::default().fit(&frame).unwrap_err();
        assert!(matches!(err, ComputeError::InsufficientHistory(_)));
    }

    #[test]
    fn two_point_frame_still_fits() {
        let frame = frame_from(start(), 2, |i| 5.0 + i as f64);
        let fitted = AdditiveModel::default().fit(&frame).unwrap();
        let forecast = fitted.predict(&fitted.make_future_dates(5));
        assert_eq!(forecast.len(), 7);
        assert!(forecast.points().iter().all(|p| p.yhat.is_finite()));
    }
}
