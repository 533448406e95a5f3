//! Cosmetic arrow field drawn around the observation point.

use serde::Serialize;

use crate::constants::{DEFAULT_GRID_SIZE, DEFAULT_GRID_SPACING};
use crate::models::{wrap_degrees, Coordinates, GridArrow, Observation};

/// Longest arrow the map overlay draws, in pixels.
pub const MAX_ARROW_LENGTH_PX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldConfig {
    /// Points per side. Even sizes are bumped to the next odd size.
    pub grid_size: usize,
    /// Degrees between neighbouring points
    pub spacing: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            spacing: DEFAULT_GRID_SPACING,
        }
    }
}

impl FieldConfig {
    pub fn with_grid_size(grid_size: usize) -> Self {
        Self {
            grid_size,
            ..Self::default()
        }
    }

    /// Side length actually generated: odd, at least 1.
    pub fn effective_size(&self) -> usize {
        self.grid_size.max(1) | 1
    }
}

/// Generates `n * n` arrows centered on `center`, where `n` is
/// [`FieldConfig::effective_size`]. Rows run south to north, columns west
/// to east.
pub fn wind_field(center: Coordinates, obs: &Observation, config: &FieldConfig) -> Vec<GridArrow> {
    let n = config.effective_size();
    let half = (n / 2) as i64;
    let size = n as f64;

    let mut arrows = Vec::with_capacity(n * n);
    for i in -half..=half {
        for j in -half..=half {
            let (fi, fj) = (i as f64, j as f64);

            let distance = (fi * fi + fj * fj).sqrt();
            let terrain = 1.0 - (distance / size) * 0.3;

            let x_influence = (fi * 0.7).sin() * 0.8;
            let y_influence = (fj * 0.7).cos() * 0.8;

            arrows.push(GridArrow {
                lat: center.lat + fi * config.spacing,
                lon: center.lon + fj * config.spacing,
                speed: obs.speed * terrain * (1.0 + x_influence * 0.2),
                direction: wrap_degrees(obs.direction + y_influence * 15.0 + x_influence * 10.0),
            });
        }
    }
    arrows
}

/// Display length of an arrow for the given speed.
pub fn arrow_length(speed: f64) -> f64 {
    (speed * 20.0).min(MAX_ARROW_LENGTH_PX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Coordinates = Coordinates {
        lat: 48.8566,
        lon: 2.3522,
    };

    #[test]
    fn test_field_has_grid_size_squared_points() {
        let obs = Observation::new(6.0, 200.0);
        for size in [1, 3, 5, 7] {
            let field = wind_field(CENTER, &obs, &FieldConfig::with_grid_size(size));
            assert_eq!(field.len(), size * size);
        }
    }

    #[test]
    fn test_field_is_centered_with_spacing() {
        let obs = Observation::new(6.0, 200.0);
        let config = FieldConfig::default();
        let field = wind_field(CENTER, &obs, &config);

        let middle = field[field.len() / 2];
        assert_eq!(middle.lat, CENTER.lat);
        assert_eq!(middle.lon, CENTER.lon);

        let min_lat = field.iter().map(|a| a.lat).fold(f64::INFINITY, f64::min);
        let max_lat = field.iter().map(|a| a.lat).fold(f64::NEG_INFINITY, f64::max);
        assert!((max_lat - min_lat - 4.0 * config.spacing).abs() < 1e-12);
        assert!((field[1].lon - field[0].lon - config.spacing).abs() < 1e-12);
    }

    #[test]
    fn test_center_arrow_values() {
        // i = j = 0: full terrain factor, no x influence, y influence 0.8
        let obs = Observation::new(10.0, 350.0);
        let field = wind_field(CENTER, &obs, &FieldConfig::default());
        let middle = field[12];
        assert!((middle.speed - 10.0).abs() < 1e-9);
        assert!((middle.direction - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_directions_always_wrapped() {
        for deg in [0.0, 1.0, 359.0] {
            let obs = Observation::new(3.0, deg);
            let field = wind_field(CENTER, &obs, &FieldConfig::with_grid_size(9));
            assert!(field.iter().all(|a| (0.0..360.0).contains(&a.direction)));
        }
    }

    #[test]
    fn test_even_grid_size_rounds_up() {
        let config = FieldConfig::with_grid_size(4);
        assert_eq!(config.effective_size(), 5);
        assert_eq!(FieldConfig::with_grid_size(0).effective_size(), 1);
        let field = wind_field(CENTER, &Observation::new(1.0, 0.0), &config);
        assert_eq!(field.len(), 25);
    }

    #[test]
    fn test_arrow_length_is_capped() {
        assert_eq!(arrow_length(2.0), 40.0);
        assert_eq!(arrow_length(5.0), 100.0);
        assert_eq!(arrow_length(30.0), 100.0);
    }
}
