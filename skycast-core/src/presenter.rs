//! Orchestrates fetch, cache and projection into a display-ready model.
//!
//! [`WeatherPresenter::refresh`] fetches for a coordinate pair, persists the
//! record and projects it; [`WeatherPresenter::load_cached`] projects whatever
//! the last successful refresh stored. Both go through [`DisplayModel::project`]
//! so a cached model reads exactly like a freshly fetched one.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::{
    cache::WeatherCache,
    error::WeatherError,
    icon::{AssetId, map_icon_code},
    location::LocationProvider,
    model::{Coordinates, WeatherQuery, WeatherRecord},
    network::NetworkProbe,
    provider::WeatherProvider,
    units::select_unit_suffix,
};

/// `hh:mm`, 12-hour, no AM/PM.
const CLOCK_FORMAT: &str = "%I:%M";
/// e.g. `Fri, 1 Jan 12:00 AM`
const AS_OF_FORMAT: &str = "%a, %-d %b %-I:%M %p";

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Time zone used for sunrise, sunset and the as-of stamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayZone {
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl DisplayZone {
    pub fn utc() -> Self {
        DisplayZone::Fixed(Utc.fix())
    }

    /// `None` when the offset is outside ±24h.
    pub fn from_offset_seconds(seconds: i32) -> Option<Self> {
        FixedOffset::east_opt(seconds).map(DisplayZone::Fixed)
    }

    fn format(&self, at: DateTime<Utc>, fmt: &str) -> String {
        match self {
            DisplayZone::Local => at.with_timezone(&Local).format(fmt).to_string(),
            DisplayZone::Fixed(offset) => at.with_timezone(offset).format(fmt).to_string(),
        }
    }

    fn format_unix_clock(&self, unix_seconds: i64) -> String {
        match DateTime::from_timestamp(unix_seconds, 0) {
            Some(at) => self.format(at, CLOCK_FORMAT),
            None => "--:--".to_string(),
        }
    }
}

/// What the screen shows. Recomputed from a [`WeatherRecord`] every time.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayModel {
    pub description: String,
    /// `None` until a known icon code has been seen.
    pub icon: Option<AssetId>,
    pub unit_suffix: &'static str,
    pub temp_min: String,
    pub temp_max: String,
    /// Carries the temperature suffix, not `%`. Kept as the app has always shown it.
    pub humidity: String,
    pub wind_speed: String,
    pub city_name: String,
    pub country: String,
    pub sunrise: String,
    pub sunset: String,
    pub as_of: String,
}

impl DisplayModel {
    /// Pure projection of a record at `now`. Unknown icon codes yield `icon: None`.
    pub fn project(record: &WeatherRecord, zone: DisplayZone, now: DateTime<Utc>) -> Self {
        let unit = select_unit_suffix(&record.sys.country);
        let primary = record.primary_condition();

        Self {
            description: primary.map(|c| c.description.clone()).unwrap_or_default(),
            icon: primary.and_then(|c| map_icon_code(&c.icon)),
            unit_suffix: unit,
            temp_min: format!("{}{unit}", decimal(record.main.temp_min)),
            temp_max: format!("{}{unit}", decimal(record.main.temp_max)),
            humidity: format!("{}{unit}", record.main.humidity),
            wind_speed: decimal(record.wind.speed),
            city_name: record.name.clone(),
            country: record.sys.country.clone(),
            sunrise: zone.format_unix_clock(record.sys.sunrise),
            sunset: zone.format_unix_clock(record.sys.sunset),
            as_of: zone.format(now, AS_OF_FORMAT),
        }
    }
}

/// Shortest round-trip form, always with a fractional part (`12.0`, `4.63`).
fn decimal(value: f64) -> String {
    format!("{value:?}")
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Updated(DisplayModel),
    /// The network was unreachable; nothing was requested and the cache is untouched.
    Skipped,
}

pub struct WeatherPresenter {
    provider: Box<dyn WeatherProvider>,
    cache: WeatherCache,
    network: Box<dyn NetworkProbe>,
    api_key: String,
    zone: DisplayZone,
    clock: Clock,
    // Held for a whole refresh so overlapping calls apply in completion order.
    displayed_icon: Mutex<Option<AssetId>>,
}

impl WeatherPresenter {
    pub fn new(
        provider: Box<dyn WeatherProvider>,
        cache: WeatherCache,
        network: Box<dyn NetworkProbe>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            cache,
            network,
            api_key: api_key.into(),
            zone: DisplayZone::default(),
            clock: Arc::new(Utc::now),
            displayed_icon: Mutex::new(None),
        }
    }

    pub fn with_zone(mut self, zone: DisplayZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Fetch, persist and project the weather at `coordinates`.
    ///
    /// On any fetch error the cache is left as it was and the error is returned.
    #[instrument(skip(self))]
    pub async fn refresh(&self, coordinates: Coordinates) -> Result<RefreshOutcome, WeatherError> {
        let mut displayed_icon = self.displayed_icon.lock().await;

        if !self.network.is_network_available().await {
            info!("Network unavailable, skipping weather refresh");
            return Ok(RefreshOutcome::Skipped);
        }

        let query = WeatherQuery::new(coordinates, self.api_key.as_str());
        let record = match self.provider.fetch_current_weather(&query).await {
            Ok(record) => record,
            Err(e) => {
                log_fetch_failure(&e);
                return Err(e);
            }
        };

        self.cache.save(&record)?;

        Ok(RefreshOutcome::Updated(self.present(&record, &mut displayed_icon)))
    }

    /// Refresh at the latest fix from `location`.
    pub async fn refresh_from(
        &self,
        location: &dyn LocationProvider,
    ) -> Result<RefreshOutcome, WeatherError> {
        let coordinates = location.latest_fix().await?;
        self.refresh(coordinates).await
    }

    /// Project the cached record, if there is a readable one.
    pub async fn load_cached(&self) -> Option<DisplayModel> {
        let mut displayed_icon = self.displayed_icon.lock().await;

        match self.cache.load() {
            Ok(Some(record)) => Some(self.present(&record, &mut displayed_icon)),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable weather cache");
                None
            }
        }
    }

    fn present(&self, record: &WeatherRecord, displayed_icon: &mut Option<AssetId>) -> DisplayModel {
        let mut model = DisplayModel::project(record, self.zone, (self.clock)());
        model.icon = model.icon.or(*displayed_icon);
        *displayed_icon = model.icon;
        model
    }
}

impl std::fmt::Debug for WeatherPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherPresenter")
            .field("provider", &self.provider)
            .field("cache", &self.cache)
            .field("zone", &self.zone)
            .finish_non_exhaustive()
    }
}

fn log_fetch_failure(err: &WeatherError) {
    if err.is_not_found() {
        warn!(error = %err, "Weather refresh failed: location not found");
    } else if err.is_bad_request() {
        warn!(error = %err, "Weather refresh failed: bad request");
    } else {
        warn!(error = %err, "Weather refresh failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cache::WEATHER_RESPONSE_DATA,
        location::FixedLocation,
        model::fixtures,
        network::AlwaysOnline,
        store::{KeyValueStore, MemoryStore},
    };
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::{
        collections::VecDeque,
        sync::atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug, Default)]
    struct ScriptedProvider {
        responses: parking_lot::Mutex<VecDeque<Result<WeatherRecord, WeatherError>>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<Result<WeatherRecord, WeatherError>>) -> Self {
            Self { responses: parking_lot::Mutex::new(responses.into()), calls: Arc::default() }
        }
    }

    #[async_trait]
    impl WeatherProvider for ScriptedProvider {
        async fn fetch_current_weather(
            &self,
            _query: &WeatherQuery,
        ) -> Result<WeatherRecord, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(WeatherError::Location("script exhausted".into())))
        }
    }

    struct Offline;

    #[async_trait]
    impl NetworkProbe for Offline {
        async fn is_network_available(&self) -> bool {
            false
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 1, 1, 15, 4, 0).unwrap()
    }

    fn presenter(
        provider: ScriptedProvider,
        network: Box<dyn NetworkProbe>,
    ) -> (Arc<MemoryStore>, WeatherPresenter) {
        let store = Arc::new(MemoryStore::new());
        let cache = WeatherCache::new(store.clone());
        let presenter = WeatherPresenter::new(Box::new(provider), cache, network, "KEY")
            .with_zone(DisplayZone::utc())
            .with_clock(Arc::new(fixed_now));
        (store, presenter)
    }

    fn london_in(country: &str, icon: &str) -> WeatherRecord {
        let mut record = fixtures::london();
        record.sys.country = country.into();
        record.weather[0].icon = icon.into();
        record
    }

    #[test]
    fn projection_formats_fields() {
        let model = DisplayModel::project(&fixtures::london(), DisplayZone::utc(), fixed_now());

        assert_eq!(model.description, "light rain");
        assert_eq!(model.icon, Some(AssetId::Rainy));
        assert_eq!(model.unit_suffix, "°C");
        assert_eq!(model.temp_min, "10.0°C");
        assert_eq!(model.temp_max, "12.75°C");
        assert_eq!(model.humidity, "81°C");
        assert_eq!(model.wind_speed, "4.63");
        assert_eq!(model.city_name, "London");
        assert_eq!(model.country, "GB");
        assert_eq!(model.sunrise, "12:00");
        assert_eq!(model.sunset, "07:59");
        assert_eq!(model.as_of, "Fri, 1 Jan 3:04 PM");
    }

    #[test]
    fn projection_uses_fahrenheit_suffix_for_us() {
        let model = DisplayModel::project(&london_in("US", "01d"), DisplayZone::utc(), fixed_now());

        assert_eq!(model.unit_suffix, "°F");
        assert_eq!(model.temp_max, "12.75°F");
        assert_eq!(model.icon, Some(AssetId::Sunny));
    }

    #[test]
    fn projection_applies_display_offset() {
        let zone = DisplayZone::from_offset_seconds(3600).unwrap();
        let model = DisplayModel::project(&fixtures::london(), zone, fixed_now());

        assert_eq!(model.sunrise, "01:00");
        assert_eq!(model.as_of, "Fri, 1 Jan 4:04 PM");
    }

    #[test]
    fn projection_without_conditions_has_no_icon() {
        let mut record = fixtures::london();
        record.weather.clear();

        let model = DisplayModel::project(&record, DisplayZone::utc(), fixed_now());
        assert_eq!(model.description, "");
        assert_eq!(model.icon, None);
    }

    #[test]
    fn out_of_range_offset_is_rejected() {
        assert!(DisplayZone::from_offset_seconds(90_000).is_none());
    }

    #[tokio::test]
    async fn refresh_caches_and_matches_load_cached() {
        let provider = ScriptedProvider::new(vec![Ok(fixtures::london())]);
        let (_, presenter) = presenter(provider, Box::new(AlwaysOnline));

        let RefreshOutcome::Updated(fresh) =
            presenter.refresh(Coordinates::new(51.5, -0.12)).await.unwrap()
        else {
            panic!("expected an update");
        };

        let cached = presenter.load_cached().await.expect("cache populated");
        assert_eq!(cached, fresh);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_cache() {
        let provider = ScriptedProvider::new(vec![
            Ok(fixtures::london()),
            Err(WeatherError::Http { status: 404, body: "city not found".into() }),
        ]);
        let (store, presenter) = presenter(provider, Box::new(AlwaysOnline));
        let coords = Coordinates::new(51.5, -0.12);

        presenter.refresh(coords).await.unwrap();
        let before = store.get_string(WEATHER_RESPONSE_DATA).unwrap();

        let err = presenter.refresh(coords).await.unwrap_err();
        assert!(err.is_not_found());

        assert_eq!(store.get_string(WEATHER_RESPONSE_DATA).unwrap(), before);
        let cached = presenter.load_cached().await.expect("previous record kept");
        assert_eq!(cached.city_name, "London");
    }

    #[tokio::test]
    async fn offline_refresh_is_skipped_without_request() {
        let provider = ScriptedProvider::new(vec![Ok(fixtures::london())]);
        let calls = provider.calls.clone();
        let (_, presenter) = presenter(provider, Box::new(Offline));

        let outcome = presenter.refresh(Coordinates::new(0.0, 0.0)).await.unwrap();

        assert_eq!(outcome, RefreshOutcome::Skipped);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(presenter.load_cached().await.is_none());
    }

    #[tokio::test]
    async fn unknown_icon_keeps_previous_icon() {
        let provider = ScriptedProvider::new(vec![
            Ok(london_in("GB", "03n")),
            Ok(london_in("GB", "50d")),
        ]);
        let (_, presenter) = presenter(provider, Box::new(AlwaysOnline));
        let coords = Coordinates::new(51.5, -0.12);

        presenter.refresh(coords).await.unwrap();
        let RefreshOutcome::Updated(model) = presenter.refresh(coords).await.unwrap() else {
            panic!("expected an update");
        };

        assert_eq!(model.icon, Some(AssetId::CloudyPartly));
    }

    #[tokio::test]
    async fn unreadable_cache_is_treated_as_absent() {
        let (store, presenter) = presenter(ScriptedProvider::default(), Box::new(AlwaysOnline));
        store.put_string(WEATHER_RESPONSE_DATA, "garbage").unwrap();

        assert!(presenter.load_cached().await.is_none());
    }

    #[tokio::test]
    async fn refresh_from_uses_location_fix() {
        let provider = ScriptedProvider::new(vec![Ok(fixtures::london())]);
        let (_, presenter) = presenter(provider, Box::new(AlwaysOnline));

        let outcome = presenter
            .refresh_from(&FixedLocation::new(Coordinates::new(51.5, -0.12)))
            .await
            .unwrap();
        assert!(matches!(outcome, RefreshOutcome::Updated(_)));

        let err = presenter.refresh_from(&FixedLocation::default()).await.unwrap_err();
        assert!(matches!(err, WeatherError::Location(_)));
    }
}
