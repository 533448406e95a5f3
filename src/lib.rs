//! Wind observations through an OpenWeatherMap proxy, plus a synthetic
//! "Navier-Stokes inspired" forecast, prediction and map arrow field
//! derived from a single reading.

pub mod cli;
pub mod constants;
pub mod error;
pub mod field;
pub mod forecast;
pub mod formatters;
pub mod geolocation;
pub mod models;
pub mod server;
pub mod service;
pub mod tracker;
pub mod upstream;
pub mod watch;
