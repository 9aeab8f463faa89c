use crate::{
    Config, FetchFailure,
    model::{ForecastResult, WeatherSnapshot},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// A source of weather data. Each call performs exactly one outbound request.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for `location`.
    async fn fetch_current(&self, location: &str) -> Result<WeatherSnapshot, FetchFailure>;

    /// One entry per day of the 5-day/3-hour forecast for `location`.
    async fn fetch_forecast(&self, location: &str) -> Result<ForecastResult, FetchFailure>;
}

/// Construct the OpenWeather provider from config and a resolved API key.
pub fn provider_from_config(config: &Config, api_key: &str) -> Box<dyn WeatherProvider> {
    Box::new(OpenWeatherClient::with_base_url(
        api_key.to_owned(),
        config.base_url(),
    ))
}
