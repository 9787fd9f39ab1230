//! Core library for the `skycast` weather app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider client behind a trait
//! - Key/value persistence, the offline snapshot cache, and capability
//!   traits for geolocation and connectivity
//! - The location controller that sequences fetch, caching, and fallback
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod cache;
pub mod config;
pub mod connectivity;
pub mod controller;
pub mod error;
pub mod geo;
pub mod model;
pub mod provider;
pub mod store;

pub use config::{Config, DEFAULT_LOCATION};
pub use connectivity::{ConnectivityMonitor, ProbeConnectivity};
pub use controller::{Controller, ViewState};
pub use error::Error;
pub use geo::{GeoPoint, IpLocationProvider, LocationProvider};
pub use model::{
    CurrentConditions, DailySummary, Forecast, ForecastEntry, LocationQuery, Theme, Units,
};
pub use provider::{WeatherProvider, provider_from_config};
pub use store::{FileStore, MemoryStore, Store};
