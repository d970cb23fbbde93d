use crate::{
    Config, WeatherError, WeatherQuery, WeatherRecord, provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// A source of current-weather observations.
///
/// Implementations make exactly one request per call: no retry, no caching.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current_weather(&self, query: &WeatherQuery)
    -> Result<WeatherRecord, WeatherError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> Box<dyn WeatherProvider> {
    Box::new(OpenWeatherProvider::with_base_url(config.base_url()))
}
