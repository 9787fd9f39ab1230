use std::sync::Arc;

use anyhow::Result;
use inquire::{InquireError, Select, Text};
use skycast_core::{
    Config, Controller, FileStore, IpLocationProvider, ProbeConnectivity, provider_from_config,
};

use crate::render;

const MENU_SEARCH: &str = "Search for a location";
const MENU_FAVORITE: &str = "Pick a favorite";
const MENU_REMOVE: &str = "Remove a favorite";
const MENU_UNITS: &str = "Toggle units (metric/imperial)";
const MENU_THEME: &str = "Toggle theme (light/dark)";
const MENU_REFRESH: &str = "Refresh";
const MENU_QUIT: &str = "Quit";

/// Interactive credential entry, stored in the TOML config file.
pub fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Text::new("OpenWeather API key:").prompt()?;
    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn build_controller(config: &Config) -> Result<Controller> {
    let provider = Arc::from(provider_from_config(config)?);
    let store = Arc::new(FileStore::open()?);
    let geo = Arc::new(IpLocationProvider::new(config.geolocation_timeout())?);
    let connectivity = Arc::new(ProbeConnectivity::default());

    Ok(Controller::new(provider, store, geo, connectivity)
        .with_default_location(config.default_location()))
}

/// One-shot fetch-and-render for `skycast show <location>`.
pub async fn show_once(location: &str) -> Result<()> {
    let config = Config::load()?;
    let controller = build_controller(&config)?;

    controller.fetch_weather(location).await;
    render::view(&controller.state());
    Ok(())
}

/// The default session: detect a location, then loop on the action menu.
pub async fn interactive() -> Result<()> {
    let config = Config::load()?;
    let controller = build_controller(&config)?;

    println!("Detecting your location...");
    controller.initialize().await;

    loop {
        render::view(&controller.state());

        let options = vec![
            MENU_SEARCH,
            MENU_FAVORITE,
            MENU_REMOVE,
            MENU_UNITS,
            MENU_THEME,
            MENU_REFRESH,
            MENU_QUIT,
        ];
        let choice = match Select::new("What next?", options).prompt() {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        match choice {
            MENU_SEARCH => {
                let location = match Text::new("Location (e.g. Paris or Paris,FR):").prompt() {
                    Ok(location) => location,
                    Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };
                let location = location.trim();
                if !location.is_empty() {
                    controller.fetch_weather(location).await;
                }
            }
            MENU_FAVORITE => {
                if let Some(location) = pick_favorite(&controller, "Show weather for:")? {
                    controller.select_favorite(&location).await;
                }
            }
            MENU_REMOVE => {
                if let Some(location) = pick_favorite(&controller, "Remove which favorite?")? {
                    controller.remove_favorite(&location);
                }
            }
            MENU_UNITS => controller.toggle_units().await,
            MENU_THEME => controller.toggle_theme(),
            MENU_REFRESH => {
                let active = controller.state().active_location;
                if let Some(location) = active {
                    controller.fetch_weather(&location).await;
                }
            }
            _ => break,
        }
    }

    Ok(())
}

fn pick_favorite(controller: &Controller, prompt: &str) -> Result<Option<String>> {
    let favorites = controller.state().favorites;
    if favorites.is_empty() {
        println!("No saved locations yet.");
        return Ok(None);
    }

    match Select::new(prompt, favorites).prompt() {
        Ok(location) => Ok(Some(location)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
