//! Plotly figure builders for the dashboard. Each builder is pure
//! presentation: it turns a series into serialized traces plus a layout
//! that the page hands straight to `Plotly.newPlot`.

mod figures;

pub use figures::{components_figure, forecast_figure, price_history_figure, ChartFigure};
