use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Temperature/wind unit preference. Affects the `units` query parameter
/// sent to the provider and the display suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Units::Metric => Units::Imperial,
            Units::Imperial => Units::Metric,
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn wind_speed_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!("Unknown unit system '{value}'")),
        }
    }
}

/// Color theme preference. Purely presentational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Theme {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(anyhow::anyhow!("Unknown theme '{value}'")),
        }
    }
}

/// How the provider is asked to resolve a place: by free-text name
/// ("Paris" or "Paris,FR") or by coordinates from geolocation.
///
/// Names are compared by exact string equality everywhere; no case or
/// whitespace normalization is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates { lat: f64, lon: f64 },
}

/// Conditions at a single instant, as resolved by the provider.
/// Immutable once received; the next successful fetch replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
    pub pressure: u32,
    pub wind_speed: f64,
    /// Short classification, e.g. "Clouds".
    pub condition: String,
    /// Longer human-readable text, e.g. "scattered clouds".
    pub description: String,
    pub icon: String,
    pub observed_at: DateTime<Utc>,
}

/// One timestamped forecast sample (3-hour granularity in OpenWeather).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub at: DateTime<Utc>,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub condition: String,
    pub description: String,
    pub icon: String,
}

/// An ordered multi-day series of forecast samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub city_name: String,
    pub country: String,
    pub entries: Vec<ForecastEntry>,
}

/// One calendar day of the forecast, collapsed for display.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Mean of the day's sample temperatures, rounded to a whole degree.
    pub avg_temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub condition: String,
    pub icon: String,
}

impl Forecast {
    /// Collapse the 3-hourly series into per-day summaries, preserving day
    /// order. The representative condition prefers a midday (12:00-15:00)
    /// sample and falls back to the first sample of the day.
    pub fn daily_summaries(&self) -> Vec<DailySummary> {
        let mut days: Vec<(NaiveDate, Vec<&ForecastEntry>)> = Vec::new();
        for entry in &self.entries {
            let date = entry.at.date_naive();
            match days.last_mut() {
                Some((day, samples)) if *day == date => samples.push(entry),
                _ => days.push((date, vec![entry])),
            }
        }

        days.into_iter()
            .map(|(date, samples)| {
                let avg =
                    samples.iter().map(|e| e.temperature).sum::<f64>() / samples.len() as f64;
                let representative = samples
                    .iter()
                    .find(|e| (12..=15).contains(&e.at.hour()))
                    .copied()
                    .unwrap_or(samples[0]);
                let temp_min = samples.iter().map(|e| e.temp_min).fold(f64::INFINITY, f64::min);
                let temp_max =
                    samples.iter().map(|e| e.temp_max).fold(f64::NEG_INFINITY, f64::max);

                DailySummary {
                    date,
                    avg_temperature: avg.round(),
                    temp_min,
                    temp_max,
                    condition: representative.condition.clone(),
                    icon: representative.icon.clone(),
                }
            })
            .collect()
    }

    /// The first `count` samples, for the hourly strip.
    pub fn next_hours(&self, count: usize) -> &[ForecastEntry] {
        &self.entries[..self.entries.len().min(count)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(at: DateTime<Utc>, temp: f64, condition: &str) -> ForecastEntry {
        ForecastEntry {
            at,
            temperature: temp,
            feels_like: temp,
            temp_min: temp - 1.0,
            temp_max: temp + 1.0,
            humidity: 60,
            wind_speed: 3.0,
            condition: condition.to_string(),
            description: condition.to_lowercase(),
            icon: "01d".to_string(),
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn units_roundtrip_and_toggle() {
        assert_eq!(Units::try_from("metric").unwrap(), Units::Metric);
        assert_eq!(Units::try_from("imperial").unwrap(), Units::Imperial);
        assert!(Units::try_from("kelvin").is_err());
        assert_eq!(Units::Metric.toggled(), Units::Imperial);
        assert_eq!(Units::Imperial.toggled(), Units::Metric);
        assert_eq!(Units::default(), Units::Metric);
    }

    #[test]
    fn theme_roundtrip_and_toggle() {
        assert_eq!(Theme::try_from("dark").unwrap(), Theme::Dark);
        assert!(Theme::try_from("sepia").is_err());
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::default(), Theme::Light);
    }

    #[test]
    fn daily_summaries_group_by_calendar_day() {
        let forecast = Forecast {
            city_name: "Oslo".to_string(),
            country: "NO".to_string(),
            entries: vec![
                entry(at(1, 9), 10.0, "Clouds"),
                entry(at(1, 12), 14.0, "Clear"),
                entry(at(1, 18), 12.0, "Rain"),
                entry(at(2, 0), 6.0, "Rain"),
                entry(at(2, 3), 4.0, "Rain"),
            ],
        };

        let days = forecast.daily_summaries();
        assert_eq!(days.len(), 2);

        // Day one: mean of 10, 14, 12 rounds to 12; midday sample wins.
        assert_eq!(days[0].avg_temperature, 12.0);
        assert_eq!(days[0].condition, "Clear");
        assert_eq!(days[0].temp_min, 9.0);
        assert_eq!(days[0].temp_max, 15.0);

        // Day two has no midday sample; first sample of the day is used.
        assert_eq!(days[1].avg_temperature, 5.0);
        assert_eq!(days[1].condition, "Rain");
    }

    #[test]
    fn daily_summaries_empty_forecast() {
        let forecast = Forecast {
            city_name: "Oslo".to_string(),
            country: "NO".to_string(),
            entries: vec![],
        };
        assert!(forecast.daily_summaries().is_empty());
    }

    #[test]
    fn next_hours_is_bounded_by_available_samples() {
        let forecast = Forecast {
            city_name: "Oslo".to_string(),
            country: "NO".to_string(),
            entries: vec![entry(at(1, 9), 10.0, "Clouds"), entry(at(1, 12), 14.0, "Clear")],
        };
        assert_eq!(forecast.next_hours(8).len(), 2);
        assert_eq!(forecast.next_hours(1).len(), 1);
    }
}
