//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Configuration & credential resolution
//! - The OpenWeather fetchers behind the [`WeatherProvider`] trait
//! - Result value types and the single [`FetchFailure`] error
//!
//! It is used by `forecast-cli`, but can also be reused by other binaries.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;

pub use config::Config;
pub use error::FetchFailure;
pub use model::{DailyForecastEntry, ForecastResult, WeatherSnapshot};
pub use provider::{WeatherProvider, openweather::OpenWeatherClient, provider_from_config};
