use chrono::Datelike;
use common::{ForecastSeries, PriceSeries};
use plotly::common::{DashType, Fill, Line, Marker, Mode, Title};
use plotly::layout::{
    Axis, GridPattern, Layout, LayoutGrid, RangeSelector, RangeSlider, SelectorButton,
    SelectorStep, StepMode,
};
use plotly::Scatter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// A chart ready for `Plotly.newPlot(div, data, layout)`: serialized traces
/// and a serialized layout.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChartFigure {
    /// Serialized plotly traces
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
    /// Serialized plotly layout
    #[schema(value_type = Object)]
    pub layout: Value,
}

// Serializing plotly's builder types cannot fail; fall back to null rather
// than threading an impossible error through every figure.
fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Interactive open/close line chart with a range slider and preset zoom
/// buttons, matching the dashboard's "Historical Prices" panel.
pub fn price_history_figure(series: &PriceSeries) -> ChartFigure {
    let dates: Vec<String> = series.bars().iter().map(|b| b.date.to_string()).collect();
    let opens: Vec<f64> = series.bars().iter().map(|b| b.open).collect();
    let closes: Vec<f64> = series.bars().iter().map(|b| b.close).collect();

    let open_trace = Scatter::new(dates.clone(), opens)
        .mode(Mode::Lines)
        .name("Opening Price");
    let close_trace = Scatter::new(dates, closes)
        .mode(Mode::Lines)
        .name("Closing Price");

    let layout = Layout::new()
        .title(Title::with_text("Historical Prices"))
        .height(500)
        .x_axis(
            Axis::new()
                .title(Title::with_text("Date"))
                .range_slider(RangeSlider::new().visible(true))
                .range_selector(RangeSelector::new().buttons(vec![
                    SelectorButton::new()
                        .count(1)
                        .label("1d")
                        .step(SelectorStep::Day)
                        .step_mode(StepMode::Backward),
                    SelectorButton::new()
                        .count(7)
                        .label("1w")
                        .step(SelectorStep::Day)
                        .step_mode(StepMode::Backward),
                    SelectorButton::new()
                        .count(1)
                        .label("1m")
                        .step(SelectorStep::Month)
                        .step_mode(StepMode::Backward),
                    SelectorButton::new()
                        .count(3)
                        .label("3m")
                        .step(SelectorStep::Month)
                        .step_mode(StepMode::Backward),
                    SelectorButton::new()
                        .count(6)
                        .label("6m")
                        .step(SelectorStep::Month)
                        .step_mode(StepMode::Backward),
                    SelectorButton::new()
                        .count(1)
                        .label("1y")
                        .step(SelectorStep::Year)
                        .step_mode(StepMode::Backward),
                    SelectorButton::new().label("all").step(SelectorStep::All),
                ])),
        )
        .y_axis(Axis::new().title(Title::with_text("Price")));

    ChartFigure {
        data: vec![to_value(&open_trace), to_value(&close_trace)],
        layout: to_value(&layout),
    }
}

/// Observed closes, point forecast line, and the confidence band rendered
/// as a filled lower/upper trace pair.
pub fn forecast_figure(prices: &PriceSeries, forecast: &ForecastSeries) -> ChartFigure {
    let observed_dates: Vec<String> =
        prices.bars().iter().map(|b| b.date.to_string()).collect();
    let observed: Vec<f64> = prices.bars().iter().map(|b| b.close).collect();

    let forecast_dates: Vec<String> =
        forecast.points().iter().map(|p| p.ds.to_string()).collect();
    let yhat: Vec<f64> = forecast.points().iter().map(|p| p.yhat).collect();
    let lower: Vec<f64> = forecast.points().iter().map(|p| p.yhat_lower).collect();
    let upper: Vec<f64> = forecast.points().iter().map(|p| p.yhat_upper).collect();

    let observed_trace = Scatter::new(observed_dates, observed)
        .mode(Mode::Markers)
        .name("Observed")
        .marker(Marker::new().color("rgb(0, 0, 0)").size(3));

    // Lower bound first so the upper bound's tonexty fill paints the band.
    let lower_trace = Scatter::new(forecast_dates.clone(), lower)
        .mode(Mode::Lines)
        .name("Lower Bound")
        .line(Line::new().color("rgba(0, 114, 178, 0.0)").width(0.0))
        .show_legend(false);
    let upper_trace = Scatter::new(forecast_dates.clone(), upper)
        .mode(Mode::Lines)
        .name("Confidence Band")
        .line(Line::new().color("rgba(0, 114, 178, 0.0)").width(0.0))
        .fill(Fill::ToNextY)
        .fill_color("rgba(0, 114, 178, 0.2)");
    let yhat_trace = Scatter::new(forecast_dates, yhat)
        .mode(Mode::Lines)
        .name("Forecast")
        .line(Line::new().color("rgb(0, 114, 178)").width(2.0));

    let layout = Layout::new()
        .title(Title::with_text("Forecast"))
        .height(500)
        .x_axis(
            Axis::new()
                .title(Title::with_text("Date"))
                .range_slider(RangeSlider::new().visible(true)),
        )
        .y_axis(Axis::new().title(Title::with_text("Price")));

    ChartFigure {
        data: vec![
            to_value(&observed_trace),
            to_value(&lower_trace),
            to_value(&upper_trace),
            to_value(&yhat_trace),
        ],
        layout: to_value(&layout),
    }
}

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Decomposition view: trend over time, mean weekly seasonality by day of
/// week, mean yearly seasonality by day of year, in stacked subplots.
pub fn components_figure(forecast: &ForecastSeries) -> ChartFigure {
    let dates: Vec<String> = forecast.points().iter().map(|p| p.ds.to_string()).collect();
    let trend: Vec<f64> = forecast.points().iter().map(|p| p.trend).collect();

    let trend_trace = Scatter::new(dates, trend)
        .mode(Mode::Lines)
        .name("Trend")
        .line(Line::new().color("rgb(0, 114, 178)"));

    // Average the weekly component per weekday.
    let mut weekly_sum = [0.0_f64; 7];
    let mut weekly_count = [0_u32; 7];
    for point in forecast.points() {
        let idx = point.ds.weekday().num_days_from_monday() as usize;
        weekly_sum[idx] += point.weekly;
        weekly_count[idx] += 1;
    }
    let weekly_labels: Vec<String> = WEEKDAYS.iter().map(|d| d.to_string()).collect();
    let weekly_means: Vec<f64> = weekly_sum
        .iter()
        .zip(weekly_count.iter())
        .map(|(sum, count)| if *count > 0 { sum / f64::from(*count) } else { 0.0 })
        .collect();
    let weekly_trace = Scatter::new(weekly_labels, weekly_means)
        .mode(Mode::Lines)
        .name("Weekly")
        .line(Line::new().color("rgb(0, 114, 178)").dash(DashType::Solid))
        .x_axis("x2")
        .y_axis("y2");

    // Average the yearly component per day of year.
    let mut yearly_sum = vec![0.0_f64; 366];
    let mut yearly_count = vec![0_u32; 366];
    for point in forecast.points() {
        let idx = point.ds.ordinal0() as usize;
        yearly_sum[idx] += point.yearly;
        yearly_count[idx] += 1;
    }
    let mut yearly_days = Vec::new();
    let mut yearly_means = Vec::new();
    for (idx, (sum, count)) in yearly_sum.iter().zip(yearly_count.iter()).enumerate() {
        if *count > 0 {
            yearly_days.push((idx + 1) as f64);
            yearly_means.push(sum / f64::from(*count));
        }
    }
    let yearly_trace = Scatter::new(yearly_days, yearly_means)
        .mode(Mode::Lines)
        .name("Yearly")
        .line(Line::new().color("rgb(0, 114, 178)"))
        .x_axis("x3")
        .y_axis("y3");

    let layout = Layout::new()
        .title(Title::with_text("Forecast Components"))
        .height(800)
        .grid(
            LayoutGrid::new()
                .rows(3)
                .columns(1)
                .pattern(GridPattern::Independent),
        )
        .x_axis(Axis::new().title(Title::with_text("Date")))
        .x_axis2(Axis::new().title(Title::with_text("Day of week")))
        .x_axis3(Axis::new().title(Title::with_text("Day of year")))
        .y_axis(Axis::new().title(Title::with_text("Trend")))
        .y_axis2(Axis::new().title(Title::with_text("Weekly")))
        .y_axis3(Axis::new().title(Title::with_text("Yearly")));

    ChartFigure {
        data: vec![
            to_value(&trend_trace),
            to_value(&weekly_trace),
            to_value(&yearly_trace),
        ],
        layout: to_value(&layout),
    }
}
