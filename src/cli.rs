use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod commands;

use commands::{forecast, serve};

#[derive(Parser)]
#[command(name = "stockcast")]
#[command(about = "Stock forecast dashboard with CLI tools and web server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the dashboard web server
    Serve {
        /// Bind address for the web server
        ///
        /// Format: IP:PORT (e.g., 0.0.0.0:3000, 127.0.0.1:8080)
        #[arg(short, long, env = "STOCKCAST_BIND_ADDRESS", default_value = "0.0.0.0:3000")]
        bind_address: String,
    },
    /// Run the forecast pipeline once and print the tail of the result
    ///
    /// Fetches the full daily history for the ticker, fits the additive
    /// model and prints the last forecast rows, without starting a server.
    Forecast {
        /// Ticker symbol (must be in the configured set)
        #[arg(short, long, default_value = "AAPL")]
        ticker: String,

        /// Prediction horizon in years
        #[arg(short, long, default_value_t = 1)]
        years: u32,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve { bind_address } => {
                serve(&bind_address).await?;
            }
            Commands::Forecast { ticker, years } => {
                forecast(&ticker, years).await?;
            }
        }
        Ok(())
    }
}
