use crate::{
    Config,
    error::Error,
    model::{CurrentConditions, Forecast, LocationQuery, Units},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Remote weather data source: current conditions and a multi-day
/// forecast for a location, under a given unit system. Consumed as an
/// opaque external service; any transport or parse problem is a
/// [`Error::Provider`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_conditions(
        &self,
        query: &LocationQuery,
        units: Units,
    ) -> Result<CurrentConditions, Error>;

    async fn forecast(&self, query: &LocationQuery, units: Units) -> Result<Forecast, Error>;
}

/// Construct the provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured.\n\
             Hint: run `skycast configure` and enter your OpenWeather API key."
        )
    })?;

    Ok(Box::new(OpenWeatherProvider::new(api_key.to_owned())))
}
