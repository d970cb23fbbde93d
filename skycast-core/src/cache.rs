use std::sync::Arc;

use tracing::{debug, info};

use crate::{error::WeatherError, model::WeatherRecord, store::KeyValueStore};

/// Preferences file the cache slot lives in.
pub const WEATHER_PREFERENCE_NAME: &str = "WEATHER_SHARED_PREFERENCE";
/// Key of the single cache slot.
pub const WEATHER_RESPONSE_DATA: &str = "weatherResponseObject";

/// Last successful weather response, one slot, last write wins.
#[derive(Clone)]
pub struct WeatherCache {
    store: Arc<dyn KeyValueStore>,
}

impl WeatherCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn save(&self, record: &WeatherRecord) -> Result<(), WeatherError> {
        let json = serde_json::to_string(record).map_err(WeatherError::Serialization)?;
        self.store.put_string(WEATHER_RESPONSE_DATA, &json)?;

        info!(location = %record.name, observed = record.dt, "Cached weather record");
        Ok(())
    }

    /// `Ok(None)` when nothing has been cached yet.
    pub fn load(&self) -> Result<Option<WeatherRecord>, WeatherError> {
        let Some(json) = self.store.get_string(WEATHER_RESPONSE_DATA)? else {
            debug!("Weather cache slot never written");
            return Ok(None);
        };

        if json.is_empty() {
            return Ok(None);
        }

        let record = serde_json::from_str(&json).map_err(WeatherError::Deserialization)?;
        Ok(Some(record))
    }
}

impl std::fmt::Debug for WeatherCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherCache").field("key", &WEATHER_RESPONSE_DATA).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::fixtures, store::MemoryStore};

    fn cache() -> (Arc<MemoryStore>, WeatherCache) {
        let store = Arc::new(MemoryStore::new());
        let cache = WeatherCache::new(store.clone());
        (store, cache)
    }

    #[test]
    fn load_before_any_save_is_absent() {
        let (_, cache) = cache();
        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn empty_slot_is_absent() {
        let (store, cache) = cache();
        store.put_string(WEATHER_RESPONSE_DATA, "").unwrap();

        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_returns_same_record() {
        let (_, cache) = cache();
        let record = fixtures::london();

        cache.save(&record).unwrap();

        assert_eq!(cache.load().unwrap(), Some(record));
    }

    #[test]
    fn save_overwrites_previous_record() {
        let (_, cache) = cache();
        let first = fixtures::london();
        let mut second = fixtures::london();
        second.name = "Paris".into();
        second.sys.country = "FR".into();

        cache.save(&first).unwrap();
        cache.save(&second).unwrap();

        assert_eq!(cache.load().unwrap(), Some(second));
    }

    #[test]
    fn malformed_slot_is_a_deserialization_error() {
        let (store, cache) = cache();
        store.put_string(WEATHER_RESPONSE_DATA, "{\"coord\":").unwrap();

        let err = cache.load().unwrap_err();
        assert!(matches!(err, WeatherError::Deserialization(_)));
    }
}
