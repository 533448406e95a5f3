//! Terminal dashboard: location reports on stdin, wind cards on stdout.

use anyhow::Result;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::constants::DEFAULT_FORECAST_HOURS;
use crate::field::{wind_field, FieldConfig};
use crate::forecast::{hourly_forecast, local_hour, predict, rng_from_seed, PredictionRange};
use crate::formatters::{format_field, format_forecast, format_observation, format_prediction};
use crate::geolocation::{locate, parse_position_report, GeolocationError, GeolocationOptions};
use crate::models::Coordinates;
use crate::tracker::{LocationTracker, WindState};
use crate::upstream::OpenWeatherClient;

/// Waits for the next non-blank report on stdin.
async fn next_report(
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<Coordinates, GeolocationError> {
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => return parse_position_report(&line),
            Ok(None) => return Err(GeolocationError::Unsupported),
            Err(e) => {
                tracing::warn!("Failed to read location: {}", e);
                return Err(GeolocationError::PositionUnavailable);
            }
        }
    }
}

/// Renders everything the dashboard shows for one state.
pub fn render_state(state: &WindState, seed: Option<u64>, start_hour: u32) -> String {
    match state {
        WindState::Locating => "Getting Location...\n".to_string(),
        WindState::Loading(at) => {
            format!("Loading wind data for {:.4}, {:.4}...\n", at.lat, at.lon)
        }
        WindState::Failed { message, .. } => format!("{}\n", message),
        WindState::Ready { at, observation } => {
            let mut rng = rng_from_seed(seed);
            let forecast =
                hourly_forecast(observation, DEFAULT_FORECAST_HOURS, start_hour, &mut rng);
            let prediction = predict(observation, PredictionRange::default(), &mut rng);
            let field = wind_field(*at, observation, &FieldConfig::default());

            [
                format_observation(*at, observation),
                format_forecast(&forecast),
                format_prediction(&prediction),
                format_field(&field),
            ]
            .join("\n")
        }
    }
}

pub async fn run(
    client: OpenWeatherClient,
    initial: Option<Coordinates>,
    seed: Option<u64>,
) -> Result<()> {
    let options = GeolocationOptions::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    tracing::info!(
        "Requesting location (high accuracy: {})",
        options.enable_high_accuracy
    );
    println!("{}", render_state(&WindState::Locating, seed, 0));

    let first = match initial {
        Some(at) => Ok(at),
        None => locate(next_report(&mut lines), &options).await,
    };
    let mut last = match first {
        Ok(at) => (at, Instant::now()),
        Err(e) => {
            println!("{}", e);
            return Ok(());
        }
    };

    let tracker = LocationTracker::new(client);
    let mut states = tracker.subscribe();
    tracker.update_location(last.0);
    let mut input_open = true;

    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                println!("{}", render_state(&state, seed, local_hour()));
                if !input_open && !matches!(state, WindState::Loading(_)) {
                    break;
                }
            }
            report = next_report(&mut lines), if input_open => match report {
                Ok(at) if at == last.0 && last.1.elapsed() < options.maximum_age => {
                    tracing::debug!("Position unchanged, keeping current wind data");
                }
                Ok(at) => {
                    last = (at, Instant::now());
                    tracker.update_location(at);
                }
                Err(GeolocationError::Unsupported) => {
                    tracing::debug!("Location input closed");
                    input_open = false;
                    if !matches!(tracker.current(), WindState::Loading(_)) {
                        break;
                    }
                }
                Err(e) => println!("{}", e),
            },
        }
    }

    Ok(())
}
