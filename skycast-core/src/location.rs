use async_trait::async_trait;

use crate::{Coordinates, WeatherError};

/// Source of location fixes. Only the latest fix is ever used.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn latest_fix(&self) -> Result<Coordinates, WeatherError>;
}

/// A location supplied up front (command line or config), if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocation(pub Option<Coordinates>);

impl FixedLocation {
    pub fn new(coordinates: Coordinates) -> Self {
        Self(Some(coordinates))
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn latest_fix(&self) -> Result<Coordinates, WeatherError> {
        self.0.ok_or_else(|| WeatherError::Location("no location fix available".into()))
    }
}
