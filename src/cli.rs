use clap::{Parser, Subcommand};

use crate::constants::{DEFAULT_SERVER_ADDRESS, OPENWEATHER_API_BASE};
use crate::models::Coordinates;

#[derive(Debug, Parser)]
#[command(about = "Wind observations and synthetic wind forecasts.")]
pub struct Cli {
    /// OpenWeatherMap API key
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    #[arg(long, env = "OPENWEATHER_API_BASE", default_value = OPENWEATHER_API_BASE)]
    pub api_base: String,
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP proxy and forecast endpoints
    Serve {
        #[arg(long, env = "WIND_SERVER_ADDRESS", default_value = DEFAULT_SERVER_ADDRESS)]
        address: std::net::SocketAddr,
    },
    /// Serve the wind tools over MCP on stdio
    Mcp,
    /// Show live wind cards; reads further "lat,lon" lines from stdin
    Watch {
        /// Starting position as "lat,lon"; read from stdin when omitted
        #[arg(long, allow_hyphen_values = true)]
        location: Option<Coordinates>,
        /// Seed for reproducible forecasts
        #[arg(long)]
        seed: Option<u64>,
    },
}
