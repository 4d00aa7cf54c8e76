use crate::handlers::{
    dashboard::{dashboard_page, get_dashboard_data},
    forecast::{get_forecast_chart, get_forecast_components, get_forecast_summary},
    health::health_check,
    prices::{get_price_chart, get_price_summary},
    tickers::get_tickers,
};
use crate::schemas::{ApiDoc, AppState};
use axum::{routing::get, Router};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Dashboard shell
        .route("/", get(dashboard_page))
        // Health check
        .route("/health", get(health_check))
        // Ticker catalogue
        .route("/api/v1/tickers", get(get_tickers))
        // Price routes
        .route("/api/v1/prices/:ticker", get(get_price_summary))
        .route("/api/v1/prices/:ticker/chart", get(get_price_chart))
        // Forecast routes
        .route("/api/v1/forecast/:ticker", get(get_forecast_summary))
        .route("/api/v1/forecast/:ticker/chart", get(get_forecast_chart))
        .route(
            "/api/v1/forecast/:ticker/components",
            get(get_forecast_components),
        )
        // Combined dashboard endpoint
        .route("/api/v1/dashboard", get(get_dashboard_data))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(60)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
