//! The location controller: owns the current view state and sequences
//! fetch -> cache-write -> state-update -> fallback-on-failure.
//!
//! All collaborators (weather provider, key/value store, geolocation,
//! connectivity) are injected trait objects, so the whole flow can be
//! driven by fakes in tests. State lives behind a mutex that is never
//! held across an await; overlapping fetches are resolved by a request
//! sequence ticket so that only the most recently issued request may
//! update the view ("last request wins").

use chrono::Utc;
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crate::{
    cache::{self, CacheEntry, LAST_LOCATION_KEY},
    config::DEFAULT_LOCATION,
    connectivity::ConnectivityMonitor,
    error::Error,
    geo::LocationProvider,
    model::{CurrentConditions, Forecast, LocationQuery, Theme, Units},
    provider::WeatherProvider,
    store::Store,
};

const THEME_KEY: &str = "theme";
const UNITS_KEY: &str = "units";
const FAVORITES_KEY: &str = "savedLocations";

/// Everything the UI needs to render, snapshotted via [`Controller::state`].
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// The displayed location, if any. None until the first successful
    /// fetch (or cache fallback).
    pub active_location: Option<String>,
    pub units: Units,
    pub theme: Theme,
    /// Insertion-ordered, duplicate-free saved locations.
    pub favorites: Vec<String>,
    pub conditions: Option<CurrentConditions>,
    pub forecast: Option<Forecast>,
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub is_offline: bool,
}

pub struct Controller {
    provider: Arc<dyn WeatherProvider>,
    store: Arc<dyn Store>,
    geo: Arc<dyn LocationProvider>,
    connectivity: Arc<dyn ConnectivityMonitor>,
    default_location: String,
    state: Mutex<ViewState>,
    fetch_seq: AtomicU64,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("state", &*self.state.lock())
            .field("fetch_seq", &self.fetch_seq)
            .finish_non_exhaustive()
    }
}

impl Controller {
    /// Build a controller, loading persisted units, theme, and favorites.
    /// Unreadable persisted values fall back to defaults.
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        store: Arc<dyn Store>,
        geo: Arc<dyn LocationProvider>,
        connectivity: Arc<dyn ConnectivityMonitor>,
    ) -> Self {
        let units = store
            .get(UNITS_KEY)
            .and_then(|s| Units::try_from(s.as_str()).ok())
            .unwrap_or_default();
        let theme = store
            .get(THEME_KEY)
            .and_then(|s| Theme::try_from(s.as_str()).ok())
            .unwrap_or_default();
        let mut favorites: Vec<String> = store
            .get(FAVORITES_KEY)
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        favorites.retain(|f| !f.is_empty());

        let state = ViewState { units, theme, favorites, ..ViewState::default() };

        Self {
            provider,
            store,
            geo,
            connectivity,
            default_location: DEFAULT_LOCATION.to_string(),
            state: Mutex::new(state),
            fetch_seq: AtomicU64::new(0),
        }
    }

    /// Replace the built-in fallback location.
    pub fn with_default_location(mut self, location: impl Into<String>) -> Self {
        self.default_location = location.into();
        self
    }

    /// Snapshot of the current view state.
    pub fn state(&self) -> ViewState {
        self.state.lock().clone()
    }

    /// Startup flow: geolocate and fetch for the detected position. On any
    /// failure, first try the cached snapshot for the last displayed
    /// location, and only without one fall back to fetching the default
    /// location.
    pub async fn initialize(&self) {
        {
            let mut st = self.state.lock();
            st.is_loading = true;
            st.last_error = None;
        }
        let units = self.state.lock().units;
        let ticket = self.next_ticket();

        match self.locate_and_fetch(units).await {
            Ok((resolved, conditions, forecast)) => {
                self.apply_success(ticket, resolved, units, conditions, forecast);
            }
            Err(err) => {
                tracing::warn!("Initial geolocation fetch failed: {err}");

                if let Some(last) = self.store.get(LAST_LOCATION_KEY) {
                    if let Some(entry) = cache::read_entry(self.store.as_ref(), &last, units) {
                        let mut st = self.state.lock();
                        st.active_location = Some(last);
                        st.conditions = Some(entry.conditions);
                        st.forecast = Some(entry.forecast);
                        st.is_offline = true;
                        st.last_error =
                            Some("Showing saved weather data; it may be out of date".to_string());
                        st.is_loading = false;
                        return;
                    }
                }

                let fallback = self.default_location.clone();
                self.fetch_with_units(&fallback, units).await;
            }
        }
    }

    /// Fetch current conditions and forecast for `location` under the
    /// current unit system. All outcomes land in the view state; failures
    /// never blank a previously displayed snapshot.
    pub async fn fetch_weather(&self, location: &str) {
        let units = self.state.lock().units;
        self.fetch_with_units(location, units).await;
    }

    /// Alias for picking an entry from the favorites list.
    pub async fn select_favorite(&self, location: &str) {
        self.fetch_weather(location).await;
    }

    /// Flip metric/imperial and persist. If a location is displayed,
    /// re-fetch it once under the new unit system so display and cache
    /// stay consistent.
    pub async fn toggle_units(&self) {
        let (units, active) = {
            let mut st = self.state.lock();
            st.units = st.units.toggled();
            (st.units, st.active_location.clone())
        };
        self.persist(UNITS_KEY, units.as_str());

        if let Some(location) = active {
            self.fetch_with_units(&location, units).await;
        }
    }

    /// Flip light/dark and persist. No network interaction.
    pub fn toggle_theme(&self) {
        let theme = {
            let mut st = self.state.lock();
            st.theme = st.theme.toggled();
            st.theme
        };
        self.persist(THEME_KEY, theme.as_str());
    }

    /// Remove one favorite by exact match and persist. The active location
    /// is left alone even if it is the one being removed.
    pub fn remove_favorite(&self, location: &str) {
        let favorites_json = {
            let mut st = self.state.lock();
            st.favorites.retain(|f| f != location);
            serde_json::to_string(&st.favorites)
        };
        match favorites_json {
            Ok(json) => self.persist(FAVORITES_KEY, &json),
            Err(e) => tracing::warn!("Failed to serialize favorites: {e}"),
        }
    }

    async fn locate_and_fetch(
        &self,
        units: Units,
    ) -> Result<(String, CurrentConditions, Forecast), Error> {
        let position = self.geo.current_position().await?;
        let query =
            LocationQuery::Coordinates { lat: position.latitude, lon: position.longitude };

        let conditions = self.provider.current_conditions(&query, units).await?;
        let forecast = self.provider.forecast(&query, units).await?;

        // The displayed name is whatever the provider resolved the
        // coordinates to.
        Ok((conditions.location_name.clone(), conditions, forecast))
    }

    async fn fetch_with_units(&self, location: &str, units: Units) {
        let ticket = self.next_ticket();
        let online = self.connectivity.is_online();
        {
            let mut st = self.state.lock();
            st.is_loading = true;
            st.last_error = None;
            st.units = units;
            st.is_offline = !online;
        }

        if !online {
            self.serve_from_cache(location, units);
            return;
        }

        let query = LocationQuery::City(location.to_string());

        let conditions = match self.provider.current_conditions(&query, units).await {
            Ok(c) => c,
            Err(err) => {
                // A conditions failure aborts before the forecast request:
                // a forecast without conditions is never rendered.
                self.fail(ticket, location, &err);
                return;
            }
        };

        let forecast = match self.provider.forecast(&query, units).await {
            Ok(f) => f,
            Err(err) => {
                self.fail(ticket, location, &err);
                return;
            }
        };

        self.apply_success(ticket, location.to_string(), units, conditions, forecast);
    }

    /// Offline branch: serve the cached snapshot pair for (location, units)
    /// or report the miss without touching the displayed state.
    fn serve_from_cache(&self, location: &str, units: Units) {
        let entry = cache::read_entry(self.store.as_ref(), location, units);

        let mut st = self.state.lock();
        match entry {
            Some(entry) => {
                st.active_location = Some(location.to_string());
                st.conditions = Some(entry.conditions);
                st.forecast = Some(entry.forecast);
            }
            None => {
                st.last_error = Some(Error::NoCachedDataOffline.to_string());
            }
        }
        st.is_loading = false;
    }

    /// Apply a successful fetch: replace the displayed snapshots, write
    /// the cache entry, and append to favorites if absent. Responses to
    /// superseded requests are discarded wholesale.
    fn apply_success(
        &self,
        ticket: u64,
        location: String,
        units: Units,
        conditions: CurrentConditions,
        forecast: Forecast,
    ) {
        let entry = CacheEntry {
            conditions: conditions.clone(),
            forecast: forecast.clone(),
            fetched_at: Utc::now(),
        };

        let favorites_json = {
            let mut st = self.state.lock();
            if self.fetch_seq.load(Ordering::SeqCst) != ticket {
                tracing::debug!("Discarding stale response for {location}");
                return;
            }

            st.active_location = Some(location.clone());
            st.conditions = Some(conditions);
            st.forecast = Some(forecast);
            st.is_offline = false;
            st.is_loading = false;

            if !location.is_empty() && !st.favorites.iter().any(|f| f == &location) {
                st.favorites.push(location.clone());
                serde_json::to_string(&st.favorites).ok()
            } else {
                None
            }
        };

        if let Err(e) = cache::write_entry(self.store.as_ref(), &location, units, &entry) {
            tracing::warn!("Failed to write cache entry for {location}: {e}");
        }
        self.persist(LAST_LOCATION_KEY, &location);
        if let Some(json) = favorites_json {
            self.persist(FAVORITES_KEY, &json);
        }
    }

    /// Record a provider failure. The previously displayed snapshot, if
    /// any, stays in place.
    fn fail(&self, ticket: u64, location: &str, err: &Error) {
        tracing::warn!("Fetch for {location} failed: {err}");

        let mut st = self.state.lock();
        if self.fetch_seq.load(Ordering::SeqCst) != ticket {
            return;
        }
        st.last_error = Some(format!("Failed to fetch weather data for {location}"));
        st.is_loading = false;
    }

    fn next_ticket(&self) -> u64 {
        self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!("Failed to persist {key}: {e}");
        }
    }
}
