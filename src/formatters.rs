use serde::Serialize;

use crate::field::arrow_length;
use crate::forecast::Prediction;
use crate::models::{wrap_degrees, Coordinates, ForecastPoint, GridArrow, Observation};

const COMPASS_POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// 1D momentum equation the forecast model is loosely based on
pub const MODEL_EQUATION: &str = "∂u/∂t + u∂u/∂x = -(1/ρ)∂p/∂x";

/// Converts degrees to an 8-point compass direction
pub fn compass_direction(degrees: f64) -> &'static str {
    let index = (wrap_degrees(degrees) / 45.0).round() as usize % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}

/// Beaufort force and its description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Beaufort {
    pub force: u8,
    pub description: &'static str,
}

/// Upper speed bound (m/s, exclusive) for each force below 12
const BEAUFORT_LIMITS: [(f64, &str); 12] = [
    (0.5, "Calm"),
    (1.5, "Light air"),
    (3.3, "Light breeze"),
    (5.5, "Gentle breeze"),
    (7.9, "Moderate breeze"),
    (10.7, "Fresh breeze"),
    (13.8, "Strong breeze"),
    (17.1, "High wind"),
    (20.7, "Gale"),
    (24.4, "Strong gale"),
    (28.4, "Storm"),
    (32.6, "Violent storm"),
];

/// Converts wind speed in m/s to the Beaufort scale
pub fn beaufort_scale(speed: f64) -> Beaufort {
    BEAUFORT_LIMITS
        .iter()
        .enumerate()
        .find(|(_, (limit, _))| speed < *limit)
        .map(|(force, (_, description))| Beaufort {
            force: force as u8,
            description: *description,
        })
        .unwrap_or(Beaufort {
            force: 12,
            description: "Hurricane force",
        })
}

/// Formats the current observation as the summary cards
pub fn format_observation(at: Coordinates, obs: &Observation) -> String {
    let beaufort = beaufort_scale(obs.speed);
    let mut output = format!(
        "Current Wind\nLocation: {:.4}, {:.4}\n\n  Wind Speed: {:.1} m/s\n  Direction: {} ({:.0}\u{00b0})\n",
        at.lat,
        at.lon,
        obs.speed,
        compass_direction(obs.direction),
        obs.direction
    );
    if let Some(temperature) = obs.temperature {
        output.push_str(&format!("  Temperature: {:.1}\u{00b0}C\n", temperature));
    }
    if let Some(humidity) = obs.humidity {
        output.push_str(&format!("  Humidity: {:.0}%\n", humidity));
    }
    if let Some(pressure) = obs.pressure {
        output.push_str(&format!("  Pressure: {:.0} hPa\n", pressure));
    }
    output.push_str(&format!(
        "  Beaufort Scale: {} ({})\n",
        beaufort.force, beaufort.description
    ));
    output
}

/// Formats an hourly forecast
pub fn format_forecast(points: &[ForecastPoint]) -> String {
    let mut output = format!("Wind Speed Forecast ({} hours)\n\n", points.len());
    for point in points {
        output.push_str(&format!(
            "  In {:>2}h: {:>5.1} m/s {:<2} ({:.0}\u{00b0})\n",
            point.hour,
            point.speed,
            compass_direction(point.direction),
            point.direction
        ));
    }
    output
}

/// Formats a short-range prediction; points that travelled past the
/// distance range are flagged
pub fn format_prediction(prediction: &Prediction) -> String {
    let range = prediction.range;
    let mut output = format!(
        "Wind Prediction\nTime Range: {} minutes\nDistance Range: {} km\n\n",
        range.minutes, range.distance_km
    );
    for point in &prediction.points {
        let marker = if point.distance_km > range.distance_km {
            " *"
        } else {
            ""
        };
        output.push_str(&format!(
            "  After {:>4.1} min: {:>5.1} m/s {:<2} ({:.0}\u{00b0}), {:.2} km{}\n",
            point.minutes,
            point.speed,
            compass_direction(point.direction),
            point.direction,
            point.distance_km,
            marker
        ));
    }
    if prediction
        .points
        .iter()
        .any(|p| p.distance_km > range.distance_km)
    {
        output.push_str("\n  * beyond distance range\n");
    }
    output.push_str(&format!(
        "\nThis prediction uses a simplified Navier-Stokes-based model ({}).\nStorm Probability in this area: {}\n",
        MODEL_EQUATION, prediction.storm_chance
    ));
    output
}

/// Formats the arrow field as one row per latitude, north first
pub fn format_field(arrows: &[GridArrow]) -> String {
    let side = (arrows.len() as f64).sqrt().round() as usize;
    let mut output = format!("Wind Map ({}x{} grid)\n\n", side, side);
    if side == 0 {
        return output;
    }
    for row in arrows.chunks(side).rev() {
        let cells: Vec<String> = row
            .iter()
            .map(|a| {
                format!(
                    "{:>4.1} {:<2} {:>3.0}px",
                    a.speed,
                    compass_direction(a.direction),
                    arrow_length(a.speed)
                )
            })
            .collect();
        output.push_str(&format!("  {:.4}: {}\n", row[0].lat, cells.join(" | ")));
    }
    output
}
