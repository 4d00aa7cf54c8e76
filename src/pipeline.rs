//! The dashboard pipeline: load (cached) -> train -> fit -> predict, as a
//! pure function of [`DashboardParams`]. Every control change on the page
//! dispatches a fresh run; a process-wide generation counter lets a newer
//! run supersede older in-flight ones so only the latest parameters ever
//! replace the rendered output.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use common::{DashboardParams, ForecastSeries, PriceSeries};
use compute::ComputeError;
use market::MarketError;
use std::sync::atomic::Ordering;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::schemas::{AppState, CachedData, ErrorResponse};

/// Error types for a pipeline run, mapped onto HTTP responses so handlers
/// can surface them inline instead of crashing the page.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("unknown ticker '{0}'")]
    UnknownTicker(String),

    #[error("horizon of {years} years is outside the supported {min}..={max} range")]
    InvalidHorizon { years: u32, min: u32, max: u32 },

    #[error(transparent)]
    Market(#[from] MarketError),

    #[error(transparent)]
    Compute(#[from] ComputeError),

    /// A newer run started while this one was in flight; its result will
    /// never be rendered.
    #[error("superseded by a newer pipeline run")]
    Superseded,

    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::UnknownTicker(_) => (StatusCode::NOT_FOUND, "UNKNOWN_TICKER"),
            Self::InvalidHorizon { .. } => (StatusCode::BAD_REQUEST, "INVALID_HORIZON"),
            Self::Market(_) => (StatusCode::BAD_GATEWAY, "DATA_UNAVAILABLE"),
            Self::Compute(ComputeError::InsufficientHistory(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_HISTORY")
            }
            Self::Compute(ComputeError::ModelFitFailure(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "MODEL_FIT_FAILURE")
            }
            Self::Superseded => (StatusCode::CONFLICT, "SUPERSEDED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            success: false,
        };
        (status, Json(body)).into_response()
    }
}

/// Rejects parameters outside the configured ticker set or horizon bounds.
pub fn validate_params(state: &AppState, params: &DashboardParams) -> Result<(), PipelineError> {
    if !state.config.is_known_ticker(&params.ticker) {
        return Err(PipelineError::UnknownTicker(params.ticker.clone()));
    }
    let (min, max) = (
        state.config.min_horizon_years,
        state.config.max_horizon_years,
    );
    if params.horizon_years < min || params.horizon_years > max {
        return Err(PipelineError::InvalidHorizon {
            years: params.horizon_years,
            min,
            max,
        });
    }
    Ok(())
}

/// Starts a new pipeline generation, marking all older runs stale.
pub fn begin_run(state: &AppState) -> u64 {
    state.generation.fetch_add(1, Ordering::SeqCst) + 1
}

/// Bails out of a run that a newer one has superseded.
pub fn ensure_current(state: &AppState, generation: u64) -> Result<(), PipelineError> {
    if state.generation.load(Ordering::SeqCst) != generation {
        warn!(generation, "pipeline run superseded, discarding result");
        return Err(PipelineError::Superseded);
    }
    Ok(())
}

/// Loads daily history for a ticker through the per-ticker cache: one
/// upstream fetch per ticker per cache lifetime.
#[instrument(skip(state))]
pub async fn load_prices(state: &AppState, ticker: &str) -> Result<PriceSeries, PipelineError> {
    let cache_key = format!("prices_{ticker}");

    if let Some(CachedData::Prices(series)) = state.cache.get(&cache_key).await {
        debug!(ticker, rows = series.len(), "price series served from cache");
        return Ok(series);
    }

    let end = Utc::now().date_naive();
    let series = state
        .market
        .fetch_daily(ticker, state.config.history_start, end)
        .await?;

    state
        .cache
        .insert(cache_key, CachedData::Prices(series.clone()))
        .await;
    info!(ticker, rows = series.len(), "price series fetched and cached");
    Ok(series)
}

/// One full forecast run: validated params in, (history, forecast) out.
/// The model fit is the expensive, CPU-bound step and runs on the blocking
/// pool; nothing about the fit or its result is cached.
#[instrument(skip(state))]
pub async fn run_forecast(
    state: &AppState,
    params: &DashboardParams,
) -> Result<(PriceSeries, ForecastSeries), PipelineError> {
    validate_params(state, params)?;
    let generation = begin_run(state);

    let prices = load_prices(state, &params.ticker).await?;
    ensure_current(state, generation)?;

    let frame = prices.to_training_frame();
    let horizon_days = params.horizon_days();
    let forecast =
        tokio::task::spawn_blocking(move || compute::forecast_with_defaults(&frame, horizon_days))
            .await
            .map_err(|e| PipelineError::Internal(e.to_string()))??;
    ensure_current(state, generation)?;

    debug!(
        ticker = %params.ticker,
        horizon_days,
        forecast_rows = forecast.len(),
        "forecast pipeline completed"
    );
    Ok((prices, forecast))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_utils::setup_test_app_state;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn validate_rejects_unknown_ticker_and_bad_horizon() {
        let (state, _market) = setup_test_app_state();

        let err = validate_params(&state, &DashboardParams::new("ZZZZ", 1)).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownTicker(_)));

        let err = validate_params(&state, &DashboardParams::new("AAPL", 0)).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidHorizon { .. }));

        let err = validate_params(&state, &DashboardParams::new("AAPL", 11)).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidHorizon { .. }));

        assert!(validate_params(&state, &DashboardParams::new("AAPL", 10)).is_ok());
    }

    #[tokio::test]
    async fn newer_generation_supersedes_older_run() {
        let (state, _market) = setup_test_app_state();

        let older = begin_run(&state);
        assert!(ensure_current(&state, older).is_ok());

        let newer = begin_run(&state);
        assert!(matches!(
            ensure_current(&state, older),
            Err(PipelineError::Superseded)
        ));
        assert!(ensure_current(&state, newer).is_ok());
    }

    #[tokio::test]
    async fn load_prices_fetches_once_per_ticker() {
        let (state, market) = setup_test_app_state();

        let first = load_prices(&state, "AAPL").await.unwrap();
        let second = load_prices(&state, "AAPL").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(market.fetch_count(), 1);

        load_prices(&state, "GME").await.unwrap();
        assert_eq!(market.fetch_count(), 2);
    }

    #[tokio::test]
    async fn run_forecast_extends_history_by_horizon() {
        let (state, _market) = setup_test_app_state();
        let params = DashboardParams::new("AAPL", 2);

        let (prices, forecast) = run_forecast(&state, &params).await.unwrap();
        assert_eq!(forecast.len(), prices.len() + 730);
        assert_eq!(
            forecast.last_date(),
            prices.last_date().map(|d| d + chrono::Duration::days(730))
        );
        // Each completed run leaves the generation at the value it took.
        assert!(state.generation.load(Ordering::SeqCst) >= 1);
    }
}
