use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use charts::ChartFigure;
use common::DashboardParams;
use tracing::instrument;

use crate::handlers::TAIL_ROWS;
use crate::pipeline::{self, PipelineError};
use crate::schemas::{ApiResponse, AppState, ForecastQuery, ForecastSummaryResponse};

fn params_from(ticker: String, query: &ForecastQuery, state: &AppState) -> DashboardParams {
    DashboardParams::new(ticker, query.years.unwrap_or(state.config.min_horizon_years))
}

/// Run the forecast pipeline and summarize the result
#[utoipa::path(
    get,
    path = "/api/v1/forecast/{ticker}",
    tag = "forecast",
    params(
        ("ticker" = String, Path, description = "Ticker symbol"),
        ("years" = Option<u32>, Query, description = "Prediction horizon in years"),
    ),
    responses(
        (status = 200, description = "Forecast computed successfully", body = ApiResponse<ForecastSummaryResponse>),
        (status = 400, description = "Horizon outside configured bounds", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Unknown ticker", body = crate::schemas::ErrorResponse),
        (status = 422, description = "Too little history to fit a model", body = crate::schemas::ErrorResponse),
        (status = 502, description = "Market data unavailable", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument]
pub async fn get_forecast_summary(
    Path(ticker): Path<String>,
    Query(query): Query<ForecastQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ForecastSummaryResponse>>, PipelineError> {
    let params = params_from(ticker, &query, &state);
    let (prices, forecast) = pipeline::run_forecast(&state, &params).await?;

    let response = ForecastSummaryResponse {
        ticker: params.ticker.clone(),
        years: params.horizon_years,
        horizon_days: params.horizon_days(),
        history_rows: prices.len(),
        forecast_rows: forecast.len(),
        last_history_date: prices.last_date(),
        last_forecast_date: forecast.last_date(),
        tail: forecast.tail(TAIL_ROWS),
    };

    Ok(Json(ApiResponse {
        data: response,
        message: "Forecast computed successfully".to_string(),
        success: true,
    }))
}

/// Build the forecast figure with its confidence band
#[utoipa::path(
    get,
    path = "/api/v1/forecast/{ticker}/chart",
    tag = "forecast",
    params(
        ("ticker" = String, Path, description = "Ticker symbol"),
        ("years" = Option<u32>, Query, description = "Prediction horizon in years"),
    ),
    responses(
        (status = 200, description = "Forecast chart built successfully", body = ApiResponse<ChartFigure>),
        (status = 400, description = "Horizon outside configured bounds", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Unknown ticker", body = crate::schemas::ErrorResponse),
        (status = 422, description = "Too little history to fit a model", body = crate::schemas::ErrorResponse),
        (status = 502, description = "Market data unavailable", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument]
pub async fn get_forecast_chart(
    Path(ticker): Path<String>,
    Query(query): Query<ForecastQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ChartFigure>>, PipelineError> {
    let params = params_from(ticker, &query, &state);
    let (prices, forecast) = pipeline::run_forecast(&state, &params).await?;
    let figure = charts::forecast_figure(&prices, &forecast);

    Ok(Json(ApiResponse {
        data: figure,
        message: "Forecast chart built successfully".to_string(),
        success: true,
    }))
}

/// Build the trend/seasonality decomposition figure
#[utoipa::path(
    get,
    path = "/api/v1/forecast/{ticker}/components",
    tag = "forecast",
    params(
        ("ticker" = String, Path, description = "Ticker symbol"),
        ("years" = Option<u32>, Query, description = "Prediction horizon in years"),
    ),
    responses(
        (status = 200, description = "Components chart built successfully", body = ApiResponse<ChartFigure>),
        (status = 400, description = "Horizon outside configured bounds", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Unknown ticker", body = crate::schemas::ErrorResponse),
        (status = 422, description = "Too little history to fit a model", body = crate::schemas::ErrorResponse),
        (status = 502, description = "Market data unavailable", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument]
pub async fn get_forecast_components(
    Path(ticker): Path<String>,
    Query(query): Query<ForecastQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ChartFigure>>, PipelineError> {
    let params = params_from(ticker, &query, &state);
    let (_prices, forecast) = pipeline::run_forecast(&state, &params).await?;
    let figure = charts::components_figure(&forecast);

    Ok(Json(ApiResponse {
        data: figure,
        message: "Components chart built successfully".to_string(),
        success: true,
    }))
}
