use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::Error,
    model::{CurrentConditions, Forecast, ForecastEntry, LocationQuery, Units},
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http }
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn query_params(&self, query: &LocationQuery, units: Units) -> Vec<(&'static str, String)> {
        let mut params = match query {
            LocationQuery::City(name) => vec![("q", name.clone())],
            LocationQuery::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        };
        params.push(("appid", self.api_key.clone()));
        params.push(("units", units.as_str().to_string()));
        params
    }

    async fn get_json(
        &self,
        path: &str,
        query: &LocationQuery,
        units: Units,
        what: &str,
    ) -> Result<String, Error> {
        let url = format!("{}/{path}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&self.query_params(query, units))
            .send()
            .await
            .map_err(|e| Error::Provider(format!("Failed to send request to OpenWeather ({what}): {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| Error::Provider(format!("Failed to read OpenWeather {what} response body: {e}")))?;

        if !status.is_success() {
            return Err(Error::Provider(format!(
                "OpenWeather {what} request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

fn classification(weather: &[OwWeather]) -> (String, String, String) {
    weather.first().map_or_else(
        || ("Unknown".to_string(), "unknown".to_string(), String::new()),
        |w| (w.main.clone(), w.description.clone(), w.icon.clone()),
    )
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_conditions(
        &self,
        query: &LocationQuery,
        units: Units,
    ) -> Result<CurrentConditions, Error> {
        let body = self.get_json("weather", query, units, "current weather").await?;

        let parsed: OwCurrentResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Provider(format!("Failed to parse OpenWeather current JSON: {e}")))?;

        let observed_at = unix_to_utc(parsed.dt).unwrap_or_else(Utc::now);
        let (condition, description, icon) = classification(&parsed.weather);

        Ok(CurrentConditions {
            location_name: parsed.name,
            country: parsed.sys.country.unwrap_or_default(),
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            temp_min: parsed.main.temp_min,
            temp_max: parsed.main.temp_max,
            humidity: parsed.main.humidity,
            pressure: parsed.main.pressure,
            wind_speed: parsed.wind.speed,
            condition,
            description,
            icon,
            observed_at,
        })
    }

    async fn forecast(&self, query: &LocationQuery, units: Units) -> Result<Forecast, Error> {
        let body = self.get_json("forecast", query, units, "forecast").await?;

        let parsed: OwForecastResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Provider(format!("Failed to parse OpenWeather forecast JSON: {e}")))?;

        let entries = parsed
            .list
            .into_iter()
            .map(|e| {
                let (condition, description, icon) = classification(&e.weather);
                ForecastEntry {
                    at: unix_to_utc(e.dt).unwrap_or_else(Utc::now),
                    temperature: e.main.temp,
                    feels_like: e.main.feels_like,
                    temp_min: e.main.temp_min,
                    temp_max: e.main.temp_max,
                    humidity: e.main.humidity,
                    wind_speed: e.wind.speed,
                    condition,
                    description,
                    icon,
                }
            })
            .collect();

        Ok(Forecast { city_name: parsed.city.name, country: parsed.city.country, entries })
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    // Cut on a char boundary; byte MAX may fall inside a multibyte char.
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::truncate_body;

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn truncate_body_cuts_long_ascii_at_limit() {
        let body = "x".repeat(300);
        let truncated = truncate_body(&body);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn truncate_body_backs_off_to_char_boundary() {
        // 'é' spans bytes 199..201, straddling the cut point.
        let body = format!("{}é{}", "x".repeat(199), "y".repeat(100));
        let truncated = truncate_body(&body);
        assert_eq!(truncated, format!("{}...", "x".repeat(199)));
    }
}
