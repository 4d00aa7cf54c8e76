use axum::{extract::State, response::Json};
use tracing::instrument;

use crate::schemas::{ApiResponse, AppState, TickersResponse};

/// List the configured tickers and horizon bounds
#[utoipa::path(
    get,
    path = "/api/v1/tickers",
    tag = "tickers",
    responses(
        (status = 200, description = "Ticker catalogue retrieved successfully", body = ApiResponse<TickersResponse>)
    )
)]
#[instrument]
pub async fn get_tickers(State(state): State<AppState>) -> Json<ApiResponse<TickersResponse>> {
    let response = TickersResponse {
        tickers: state.config.tickers.clone(),
        min_years: state.config.min_horizon_years,
        max_years: state.config.max_horizon_years,
        default_years: state.config.min_horizon_years,
    };

    Json(ApiResponse {
        data: response,
        message: "Ticker catalogue retrieved successfully".to_string(),
        success: true,
    })
}
