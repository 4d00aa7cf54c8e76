use axum::{
    extract::{Path, State},
    response::Json,
};
use charts::ChartFigure;
use tracing::instrument;

use crate::handlers::TAIL_ROWS;
use crate::pipeline::{self, PipelineError};
use crate::schemas::{ApiResponse, AppState, PriceSummaryResponse};

/// Get the loaded price history for a ticker
#[utoipa::path(
    get,
    path = "/api/v1/prices/{ticker}",
    tag = "prices",
    params(
        ("ticker" = String, Path, description = "Ticker symbol"),
    ),
    responses(
        (status = 200, description = "Price history retrieved successfully", body = ApiResponse<PriceSummaryResponse>),
        (status = 404, description = "Unknown ticker", body = crate::schemas::ErrorResponse),
        (status = 502, description = "Market data unavailable", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument]
pub async fn get_price_summary(
    Path(ticker): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PriceSummaryResponse>>, PipelineError> {
    let ticker = ticker.to_uppercase();
    if !state.config.is_known_ticker(&ticker) {
        return Err(PipelineError::UnknownTicker(ticker));
    }

    let series = pipeline::load_prices(&state, &ticker).await?;
    let response = PriceSummaryResponse {
        ticker,
        rows: series.len(),
        first_date: series.first_date(),
        last_date: series.last_date(),
        tail: series.tail(TAIL_ROWS),
    };

    Ok(Json(ApiResponse {
        data: response,
        message: "Price history retrieved successfully".to_string(),
        success: true,
    }))
}

/// Get the interactive raw-price figure for a ticker
#[utoipa::path(
    get,
    path = "/api/v1/prices/{ticker}/chart",
    tag = "prices",
    params(
        ("ticker" = String, Path, description = "Ticker symbol"),
    ),
    responses(
        (status = 200, description = "Price chart built successfully", body = ApiResponse<ChartFigure>),
        (status = 404, description = "Unknown ticker", body = crate::schemas::ErrorResponse),
        (status = 502, description = "Market data unavailable", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument]
pub async fn get_price_chart(
    Path(ticker): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ChartFigure>>, PipelineError> {
    let ticker = ticker.to_uppercase();
    if !state.config.is_known_ticker(&ticker) {
        return Err(PipelineError::UnknownTicker(ticker));
    }

    let series = pipeline::load_prices(&state, &ticker).await?;
    let figure = charts::price_history_figure(&series);

    Ok(Json(ApiResponse {
        data: figure,
        message: "Price chart built successfully".to_string(),
        success: true,
    }))
}
