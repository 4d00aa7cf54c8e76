//! Domain types shared between the market, compute, charts and server
//! crates. These structs mirror the handlers' response payloads so every
//! crate agrees on the shape of a price series and a forecast without
//! duplicating definitions.

mod forecast;
mod params;
mod prices;

pub use forecast::{ForecastPoint, ForecastSeries};
pub use params::DashboardParams;
pub use prices::{PriceBar, PriceSeries, TrainingFrame};
