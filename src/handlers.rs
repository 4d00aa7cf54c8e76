pub mod dashboard;
pub mod forecast;
pub mod health;
pub mod prices;
pub mod tickers;

/// Rows shown in the raw-data and forecast tail tables.
pub const TAIL_ROWS: usize = 5;
