use serde::{Deserialize, Serialize};

/// Unit system sent to the provider. Display units are chosen separately by country.
pub const METRIC_UNITS: &str = "metric";

/// A location fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherQuery {
    pub coordinates: Coordinates,
    pub units: &'static str,
    pub api_key: String,
}

impl WeatherQuery {
    pub fn new(coordinates: Coordinates, api_key: impl Into<String>) -> Self {
        Self { coordinates, units: METRIC_UNITS, api_key: api_key.into() }
    }
}

/// Current-weather response, with the provider's JSON field names.
///
/// The same shape is written to and read back from the cache, so a record
/// survives a save/load cycle unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub coord: Coord,
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub base: String,
    pub main: Measurements,
    #[serde(default)]
    pub visibility: i64,
    pub wind: Wind,
    pub clouds: Clouds,
    /// Observation time, unix seconds.
    pub dt: i64,
    pub sys: Sys,
    /// Offset from UTC in seconds.
    #[serde(default)]
    pub timezone: i64,
    pub id: i64,
    pub name: String,
    pub cod: i64,
}

impl WeatherRecord {
    /// The first condition drives the icon and description.
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.weather.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: i64,
    pub humidity: i64,
    #[serde(default)]
    pub sea_level: i64,
    #[serde(default)]
    pub grnd_level: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    pub deg: i64,
    #[serde(default)]
    pub gust: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clouds {
    pub all: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sys {
    #[serde(default, rename = "type")]
    pub kind: i64,
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}
