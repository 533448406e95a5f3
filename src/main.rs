use anyhow::Result;
use clap::Parser;
use rmcp::ServiceExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wind_forecast_server::cli::{Cli, Command};
use wind_forecast_server::service::Wind;
use wind_forecast_server::upstream::OpenWeatherClient;
use wind_forecast_server::{server, watch};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wind_forecast_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Cli::parse();
    let client = OpenWeatherClient::with_base_url(args.api_key, &args.api_base)?;

    match args.cmd {
        Command::Serve { address } => server::run(address, client).await,
        Command::Mcp => {
            tracing::info!("Starting MCP wind server");

            let wind = Wind::new(client)?;
            let server = wind.serve(rmcp::transport::stdio()).await?;
            server.waiting().await?;

            tracing::info!("Server shutdown complete");
        }
        Command::Watch { location, seed } => watch::run(client, location, seed).await?,
    }

    Ok(())
}
