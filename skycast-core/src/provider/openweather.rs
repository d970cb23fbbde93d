use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::{WeatherError, WeatherQuery, WeatherRecord};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// `base_url` is everything before `/2.5/weather`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http: Client::new() }
    }

    fn current_weather_url(&self) -> String {
        format!("{}/2.5/weather", self.base_url)
    }
}

impl Default for OpenWeatherProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self, query), fields(lat = query.coordinates.latitude, lon = query.coordinates.longitude))]
    async fn fetch_current_weather(
        &self,
        query: &WeatherQuery,
    ) -> Result<WeatherRecord, WeatherError> {
        let res = self
            .http
            .get(self.current_weather_url())
            .query(&[
                ("lat", query.coordinates.latitude.to_string()),
                ("lon", query.coordinates.longitude.to_string()),
                ("units", query.units.to_string()),
                ("appid", query.api_key.clone()),
            ])
            .send()
            .await
            .map_err(WeatherError::Network)?;

        let status = res.status();
        let body = res.text().await.map_err(WeatherError::Network)?;
        debug!(%status, bytes = body.len(), "OpenWeather responded");

        if !status.is_success() {
            return Err(WeatherError::Http {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(WeatherError::MalformedResponse)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
