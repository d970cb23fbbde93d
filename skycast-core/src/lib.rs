//! Core library for the `skycast` weather display.
//!
//! This crate defines:
//! - Configuration handling
//! - The OpenWeather client behind a provider trait
//! - A single-slot cache of the last successful response
//! - Projection of a response into a display model (units, icons, times)
//!
//! It is used by `skycast-cli`, but the presenter can be driven by any front-end.

pub mod cache;
pub mod config;
pub mod error;
pub mod icon;
pub mod location;
pub mod model;
pub mod network;
pub mod presenter;
pub mod provider;
pub mod store;
pub mod units;

pub use cache::WeatherCache;
pub use config::Config;
pub use error::WeatherError;
pub use icon::{AssetId, map_icon_code};
pub use location::{FixedLocation, LocationProvider};
pub use model::{Coordinates, WeatherQuery, WeatherRecord};
pub use network::{AlwaysOnline, NetworkProbe, TcpProbe};
pub use presenter::{DisplayModel, DisplayZone, RefreshOutcome, WeatherPresenter};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use units::select_unit_suffix;
