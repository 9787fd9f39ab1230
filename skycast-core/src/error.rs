use thiserror::Error;

/// Failures surfaced by the core. All of them are recovered inside the
/// controller and shown as a textual banner; none abort the application.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Weather provider request failed: {0}")]
    Provider(String),

    #[error("Geolocation is unavailable")]
    GeolocationUnavailable,

    #[error("Geolocation request timed out")]
    GeolocationTimeout,

    #[error("No cached data available offline")]
    NoCachedDataOffline,

    #[error("Persistence failure: {0}")]
    Store(String),
}
