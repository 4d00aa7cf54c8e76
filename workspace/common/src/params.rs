use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Immutable input parameters for one dashboard pipeline run. Every control
/// change on the page produces a fresh set of these; there is no other
/// selection state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct DashboardParams {
    /// Ticker symbol, upper-cased
    pub ticker: String,
    /// Prediction horizon in years
    pub horizon_years: u32,
}

impl DashboardParams {
    pub fn new(ticker: impl Into<String>, horizon_years: u32) -> Self {
        Self {
            ticker: ticker.into().to_uppercase(),
            horizon_years,
        }
    }

    /// Horizon in days. Always `years * 365`, with no calendar-aware
    /// adjustment.
    pub fn horizon_days(&self) -> i64 {
        i64::from(self.horizon_years) * 365
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizon_days_is_years_times_365() {
        for years in 1..=10 {
            let params = DashboardParams::new("AAPL", years);
            assert_eq!(params.horizon_days(), i64::from(years) * 365);
        }
    }

    #[test]
    fn ticker_is_uppercased() {
        assert_eq!(DashboardParams::new("gme", 1).ticker, "GME");
    }
}
