//! Offline fallback cache: the most recent snapshot pair per
//! (location, unit system), stored as JSON in the key/value store.
//!
//! Entries are written after every successful fetch and read only when a
//! fetch cannot reach the provider. They are never consulted while online.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    model::{CurrentConditions, Forecast, Units},
    store::Store,
};

/// Store key naming the last successfully displayed location, so the
/// startup fallback knows which cache entry to try.
pub const LAST_LOCATION_KEY: &str = "lastLocation";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub conditions: CurrentConditions,
    pub forecast: Forecast,
    pub fetched_at: DateTime<Utc>,
}

fn cache_key(location: &str, units: Units) -> String {
    format!("cache:{location}:{units}")
}

pub fn write_entry(
    store: &dyn Store,
    location: &str,
    units: Units,
    entry: &CacheEntry,
) -> Result<(), Error> {
    let json = serde_json::to_string(entry)
        .map_err(|e| Error::Store(format!("Failed to serialize cache entry: {e}")))?;
    store.set(&cache_key(location, units), &json)
}

/// Read the cached snapshot pair for (location, units). An unparsable
/// entry is treated the same as a missing one.
pub fn read_entry(store: &dyn Store, location: &str, units: Units) -> Option<CacheEntry> {
    let json = store.get(&cache_key(location, units))?;
    match serde_json::from_str(&json) {
        Ok(entry) => Some(entry),
        Err(e) => {
            tracing::warn!("Discarding unreadable cache entry for {location} ({units}): {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ForecastEntry;
    use crate::store::MemoryStore;

    fn sample_entry() -> CacheEntry {
        CacheEntry {
            conditions: CurrentConditions {
                location_name: "Oslo".to_string(),
                country: "NO".to_string(),
                temperature: 4.2,
                feels_like: 1.0,
                temp_min: 2.0,
                temp_max: 6.0,
                humidity: 80,
                pressure: 1013,
                wind_speed: 5.5,
                condition: "Snow".to_string(),
                description: "light snow".to_string(),
                icon: "13d".to_string(),
                observed_at: Utc::now(),
            },
            forecast: Forecast {
                city_name: "Oslo".to_string(),
                country: "NO".to_string(),
                entries: vec![ForecastEntry {
                    at: Utc::now(),
                    temperature: 3.0,
                    feels_like: 0.0,
                    temp_min: 1.0,
                    temp_max: 4.0,
                    humidity: 85,
                    wind_speed: 4.0,
                    condition: "Snow".to_string(),
                    description: "snow".to_string(),
                    icon: "13d".to_string(),
                }],
            },
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn entries_are_keyed_by_location_and_units() {
        let store = MemoryStore::new();
        let entry = sample_entry();

        write_entry(&store, "Oslo", Units::Metric, &entry).unwrap();

        assert_eq!(read_entry(&store, "Oslo", Units::Metric), Some(entry));
        assert_eq!(read_entry(&store, "Oslo", Units::Imperial), None);
        assert_eq!(read_entry(&store, "Bergen", Units::Metric), None);
    }

    #[test]
    fn unreadable_entry_reads_as_miss() {
        let store = MemoryStore::new().with_entry("cache:Oslo:metric", "not json");
        assert_eq!(read_entry(&store, "Oslo", Units::Metric), None);
    }
}
