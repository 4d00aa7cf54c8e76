use charts::ChartFigure;
use chrono::NaiveDate;
use common::{DashboardParams, ForecastPoint, PriceBar, PriceSeries};
use market::MarketDataSource;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use utoipa::{OpenApi, ToSchema};

use crate::config::AppConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Upstream market-data source
    pub market: Arc<dyn MarketDataSource>,
    /// Per-ticker price cache
    pub cache: Cache<String, CachedData>,
    /// Runtime configuration
    pub config: Arc<AppConfig>,
    /// Pipeline generation counter; a newer run supersedes older ones
    pub generation: Arc<AtomicU64>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("market", &self.market.source_label())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    Prices(PriceSeries),
}

/// Query parameters for forecast endpoints
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ForecastQuery {
    /// Prediction horizon in years (default 1)
    pub years: Option<u32>,
}

/// Query parameters for the combined dashboard endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardQuery {
    /// Ticker symbol
    pub ticker: String,
    /// Prediction horizon in years (default 1)
    pub years: Option<u32>,
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Label of the configured market-data source
    pub market_source: String,
    /// Number of tickers currently cached
    pub cached_tickers: u64,
}

/// Ticker set and horizon bounds offered by the dashboard
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TickersResponse {
    /// Selectable tickers
    pub tickers: Vec<String>,
    /// Smallest selectable horizon in years
    pub min_years: u32,
    /// Largest selectable horizon in years
    pub max_years: u32,
    /// Horizon preselected by the page
    pub default_years: u32,
}

/// Summary of a loaded price series
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PriceSummaryResponse {
    /// Ticker symbol
    pub ticker: String,
    /// Number of daily bars loaded
    pub rows: usize,
    /// First trading day in the series
    pub first_date: Option<NaiveDate>,
    /// Last trading day in the series
    pub last_date: Option<NaiveDate>,
    /// Last rows of the series, oldest first
    pub tail: Vec<PriceBar>,
}

/// Summary of a forecast run
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ForecastSummaryResponse {
    /// Ticker symbol
    pub ticker: String,
    /// Requested horizon in years
    pub years: u32,
    /// Horizon in days (always years * 365)
    pub horizon_days: i64,
    /// Number of historical observations the model was fit on
    pub history_rows: usize,
    /// Number of forecast rows (history plus horizon)
    pub forecast_rows: usize,
    /// Last historical date
    pub last_history_date: Option<NaiveDate>,
    /// Last forecast date
    pub last_forecast_date: Option<NaiveDate>,
    /// Last rows of the forecast, oldest first
    pub tail: Vec<ForecastPoint>,
}

/// Everything one dashboard interaction needs: summaries plus the three
/// figures, produced by a single pipeline run.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    /// Parameters the pipeline ran with
    pub params: DashboardParams,
    /// Horizon in days (always years * 365)
    pub horizon_days: i64,
    /// Raw data tail, oldest first
    pub raw_tail: Vec<PriceBar>,
    /// Forecast tail, oldest first
    pub forecast_tail: Vec<ForecastPoint>,
    /// Last historical date
    pub last_history_date: Option<NaiveDate>,
    /// Last forecast date
    pub last_forecast_date: Option<NaiveDate>,
    /// Historical prices figure
    pub raw_chart: ChartFigure,
    /// Forecast figure with confidence band
    pub forecast_chart: ChartFigure,
    /// Trend/seasonality decomposition figure
    pub components_chart: ChartFigure,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::tickers::get_tickers,
        crate::handlers::prices::get_price_summary,
        crate::handlers::prices::get_price_chart,
        crate::handlers::forecast::get_forecast_summary,
        crate::handlers::forecast::get_forecast_chart,
        crate::handlers::forecast::get_forecast_components,
        crate::handlers::dashboard::get_dashboard_data,
    ),
    components(
        schemas(
            ApiResponse<HealthResponse>,
            ApiResponse<TickersResponse>,
            ApiResponse<PriceSummaryResponse>,
            ApiResponse<ForecastSummaryResponse>,
            ApiResponse<DashboardResponse>,
            ApiResponse<ChartFigure>,
            ErrorResponse,
            HealthResponse,
            TickersResponse,
            PriceSummaryResponse,
            ForecastSummaryResponse,
            DashboardResponse,
            ForecastQuery,
            DashboardQuery,
            ChartFigure,
            DashboardParams,
            PriceBar,
            ForecastPoint,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "tickers", description = "Ticker catalogue endpoints"),
        (name = "prices", description = "Historical price endpoints"),
        (name = "forecast", description = "Forecast endpoints"),
        (name = "dashboard", description = "Combined dashboard endpoint"),
    ),
    info(
        title = "Stockcast API",
        description = "Stock Forecast Dashboard - historical prices and additive-model forecasts per ticker",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
