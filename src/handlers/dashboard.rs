use axum::{
    extract::{Query, State},
    response::{Html, Json},
};
use common::DashboardParams;
use tracing::instrument;

use crate::handlers::TAIL_ROWS;
use crate::pipeline::{self, PipelineError};
use crate::schemas::{ApiResponse, AppState, DashboardQuery, DashboardResponse};

/// Run the whole pipeline for one set of dashboard parameters
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "dashboard",
    params(
        ("ticker" = String, Query, description = "Ticker symbol"),
        ("years" = Option<u32>, Query, description = "Prediction horizon in years"),
    ),
    responses(
        (status = 200, description = "Dashboard data computed successfully", body = ApiResponse<DashboardResponse>),
        (status = 400, description = "Horizon outside configured bounds", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Unknown ticker", body = crate::schemas::ErrorResponse),
        (status = 409, description = "Run superseded by newer parameters", body = crate::schemas::ErrorResponse),
        (status = 422, description = "Too little history to fit a model", body = crate::schemas::ErrorResponse),
        (status = 502, description = "Market data unavailable", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument]
pub async fn get_dashboard_data(
    Query(query): Query<DashboardQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardResponse>>, PipelineError> {
    let params = DashboardParams::new(
        query.ticker,
        query.years.unwrap_or(state.config.min_horizon_years),
    );
    let (prices, forecast) = pipeline::run_forecast(&state, &params).await?;

    let response = DashboardResponse {
        horizon_days: params.horizon_days(),
        raw_tail: prices.tail(TAIL_ROWS),
        forecast_tail: forecast.tail(TAIL_ROWS),
        last_history_date: prices.last_date(),
        last_forecast_date: forecast.last_date(),
        raw_chart: charts::price_history_figure(&prices),
        forecast_chart: charts::forecast_figure(&prices, &forecast),
        components_chart: charts::components_figure(&forecast),
        params,
    };

    Ok(Json(ApiResponse {
        data: response,
        message: "Dashboard data computed successfully".to_string(),
        success: true,
    }))
}

/// Serve the single-page dashboard shell
#[instrument]
pub async fn dashboard_page() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

/// The dashboard shell: two controls bound to the pipeline endpoint, with
/// errors rendered inline so the rest of the page survives a failed run.
const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Stock Forecast App</title>
<script src="https://cdn.plot.ly/plotly-2.32.0.min.js"></script>
<style>
  body { font-family: sans-serif; margin: 2rem auto; max-width: 960px; }
  h1 { margin-bottom: 1rem; }
  .controls { display: flex; gap: 2rem; align-items: center; margin-bottom: 1rem; }
  .error { color: #b00020; border: 1px solid #b00020; padding: 0.5rem 1rem; margin: 1rem 0; display: none; }
  .status { color: #666; margin: 0.5rem 0; }
  table { border-collapse: collapse; margin: 0.5rem 0 1.5rem; }
  th, td { border: 1px solid #ccc; padding: 0.25rem 0.75rem; text-align: right; }
  th:first-child, td:first-child { text-align: left; }
</style>
</head>
<body>
<h1>Stock Forecast App</h1>
<div class="controls">
  <label>Select ticker
    <select id="ticker"></select>
  </label>
  <label>Years of prediction:
    <input type="range" id="years" min="1" max="10" value="1">
    <span id="years-label">1</span>
  </label>
</div>
<div class="error" id="error"></div>
<div class="status" id="status"></div>
<h2>Raw data</h2>
<table id="raw-table"></table>
<div id="raw-chart"></div>
<h2>Forecast data</h2>
<table id="forecast-table"></table>
<div id="forecast-chart"></div>
<h2>Forecast components</h2>
<div id="components-chart"></div>
<script>
const tickerEl = document.getElementById('ticker');
const yearsEl = document.getElementById('years');
const yearsLabel = document.getElementById('years-label');
const errorEl = document.getElementById('error');
const statusEl = document.getElementById('status');
let inFlight = 0;

function renderTable(el, rows, columns) {
  const header = '<tr>' + columns.map(c => '<th>' + c + '</th>').join('') + '</tr>';
  const body = rows.map(r =>
    '<tr>' + columns.map(c => {
      const v = r[c];
      return '<td>' + (typeof v === 'number' ? v.toFixed(2) : v) + '</td>';
    }).join('') + '</tr>'
  ).join('');
  el.innerHTML = header + body;
}

async function refresh() {
  const run = ++inFlight;
  errorEl.style.display = 'none';
  statusEl.textContent = 'Loading data...';
  const years = yearsEl.value;
  const ticker = tickerEl.value;
  try {
    const res = await fetch(`/api/v1/dashboard?ticker=${ticker}&years=${years}`);
    const body = await res.json();
    if (run !== inFlight) return; // superseded by a newer interaction
    if (!res.ok) {
      errorEl.textContent = `${body.code}: ${body.error}`;
      errorEl.style.display = 'block';
      statusEl.textContent = '';
      return;
    }
    const d = body.data;
    statusEl.textContent =
      `Loading data... done! Forecasting for ${years} year(s), ` +
      `${d.horizon_days} days past ${d.last_history_date}.`;
    renderTable(document.getElementById('raw-table'), d.raw_tail,
      ['date', 'open', 'high', 'low', 'close', 'volume']);
    renderTable(document.getElementById('forecast-table'), d.forecast_tail,
      ['ds', 'yhat', 'yhat_lower', 'yhat_upper']);
    Plotly.newPlot('raw-chart', d.raw_chart.data, d.raw_chart.layout);
    Plotly.newPlot('forecast-chart', d.forecast_chart.data, d.forecast_chart.layout);
    Plotly.newPlot('components-chart', d.components_chart.data, d.components_chart.layout);
  } catch (e) {
    if (run !== inFlight) return;
    errorEl.textContent = 'Request failed: ' + e;
    errorEl.style.display = 'block';
    statusEl.textContent = '';
  }
}

async function init() {
  const res = await fetch('/api/v1/tickers');
  const body = await res.json();
  const catalogue = body.data;
  for (const t of catalogue.tickers) {
    const option = document.createElement('option');
    option.value = t;
    option.textContent = t;
    tickerEl.appendChild(option);
  }
  yearsEl.min = catalogue.min_years;
  yearsEl.max = catalogue.max_years;
  yearsEl.value = catalogue.default_years;
  yearsLabel.textContent = yearsEl.value;
  tickerEl.addEventListener('change', refresh);
  yearsEl.addEventListener('change', () => { yearsLabel.textContent = yearsEl.value; refresh(); });
  refresh();
}

init();
</script>
</body>
</html>
"#;
