use anyhow::{Context, Result};
use common::DashboardParams;
use tracing::info;

use crate::config::initialize_app_state;
use crate::handlers::TAIL_ROWS;
use crate::pipeline::run_forecast;

/// Run the pipeline once for a ticker/horizon pair and print the forecast
/// tail, without starting the server.
pub async fn forecast(ticker: &str, years: u32) -> Result<()> {
    let state = initialize_app_state();
    let params = DashboardParams::new(ticker, years);

    info!(ticker = %params.ticker, years, "running one-shot forecast");
    let (prices, forecast) = run_forecast(&state, &params)
        .await
        .with_context(|| format!("forecast failed for '{}'", params.ticker))?;

    println!(
        "{}: {} daily bars through {}, forecasting {} days ahead",
        params.ticker,
        prices.len(),
        prices
            .last_date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string()),
        params.horizon_days(),
    );
    println!(
        "{:<12} {:>12} {:>12} {:>12}",
        "date", "yhat", "lower", "upper"
    );
    for point in forecast.tail(TAIL_ROWS) {
        println!(
            "{:<12} {:>12.2} {:>12.2} {:>12.2}",
            point.ds, point.yhat, point.yhat_lower, point.yhat_upper
        );
    }

    Ok(())
}
