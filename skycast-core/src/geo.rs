//! One-shot device geolocation behind an injectable trait, so the
//! controller can be exercised with scripted positions and failures.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Obtain the device's current position once, within a bounded wait.
/// No stale-position caching; every call is a fresh lookup.
#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn current_position(&self) -> Result<GeoPoint, Error>;
}

const IP_LOOKUP_URL: &str = "https://ipapi.co/json/";
const USER_AGENT: &str = concat!("skycast/", env!("CARGO_PKG_VERSION"));

/// Coarse IP-based geolocation. City-level accuracy is enough here: the
/// coordinates are only used to seed the initial weather lookup, and the
/// provider resolves them back to a display name anyway.
#[derive(Debug)]
pub struct IpLocationProvider {
    http: Client,
    base_url: String,
}

impl IpLocationProvider {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build geolocation HTTP client: {e}"))?;

        Ok(Self { http, base_url: IP_LOOKUP_URL.to_string() })
    }

    /// Point the lookup at a different endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[async_trait]
impl LocationProvider for IpLocationProvider {
    async fn current_position(&self) -> Result<GeoPoint, Error> {
        let res = self.http.get(&self.base_url).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::GeolocationTimeout
            } else {
                tracing::debug!("IP geolocation request failed: {e}");
                Error::GeolocationUnavailable
            }
        })?;

        if !res.status().is_success() {
            tracing::debug!("IP geolocation returned status {}", res.status());
            return Err(Error::GeolocationUnavailable);
        }

        let body: IpLookupResponse = res.json().await.map_err(|e| {
            tracing::debug!("IP geolocation parse error: {e}");
            Error::GeolocationUnavailable
        })?;

        match (body.latitude, body.longitude) {
            (Some(latitude), Some(longitude)) => Ok(GeoPoint { latitude, longitude }),
            _ => Err(Error::GeolocationUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn resolves_coordinates_from_lookup_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"latitude": 59.91, "longitude": 10.75, "city": "Oslo"}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let provider = IpLocationProvider::new(Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());

        let point = provider.current_position().await.unwrap();
        assert_eq!(point, GeoPoint { latitude: 59.91, longitude: 10.75 });
    }

    #[tokio::test]
    async fn missing_coordinates_are_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(r#"{"city": "Oslo"}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let provider = IpLocationProvider::new(Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());

        let err = provider.current_position().await.unwrap_err();
        assert!(matches!(err, Error::GeolocationUnavailable));
    }

    #[tokio::test]
    async fn http_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = IpLocationProvider::new(Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());

        let err = provider.current_position().await.unwrap_err();
        assert!(matches!(err, Error::GeolocationUnavailable));
    }
}
