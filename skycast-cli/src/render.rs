//! Plain-text rendering of the controller's view state.

use skycast_core::{Theme, ViewState};

/// Samples shown in the hourly strip: 8 x 3-hour steps, about a day.
const HOURLY_SAMPLES: usize = 8;
const DAILY_SUMMARIES: usize = 7;

pub fn view(state: &ViewState) {
    println!();
    println!("skycast [{}, {} theme]{}", state.units, state.theme, offline_tag(state));
    println!("{}", divider(state.theme));

    if let Some(error) = &state.last_error {
        println!("! {error}");
        println!();
    }

    let Some(conditions) = &state.conditions else {
        if state.last_error.is_none() {
            println!("No weather data yet. Try searching for a location.");
        }
        return;
    };

    let units = state.units;
    let temp = units.temperature_suffix();

    println!("{}, {}  --  {}", conditions.location_name, conditions.country, conditions.description);
    println!(
        "  {:.1}{temp} (feels like {:.1}{temp}), {:.1}{temp} .. {:.1}{temp}",
        conditions.temperature, conditions.feels_like, conditions.temp_min, conditions.temp_max
    );
    println!(
        "  humidity {}%, pressure {} hPa, wind {:.1} {}",
        conditions.humidity,
        conditions.pressure,
        conditions.wind_speed,
        units.wind_speed_suffix()
    );

    let Some(forecast) = &state.forecast else {
        return;
    };

    let days = forecast.daily_summaries();
    if !days.is_empty() {
        println!();
        println!("Forecast:");
        for day in days.iter().take(DAILY_SUMMARIES) {
            println!(
                "  {}  {:>5.0}{temp}  ({:.0}{temp} .. {:.0}{temp})  {}",
                day.date.format("%a %d %b"),
                day.avg_temperature,
                day.temp_min,
                day.temp_max,
                day.condition
            );
        }
    }

    let hours = forecast.next_hours(HOURLY_SAMPLES);
    if !hours.is_empty() {
        println!();
        println!("Next hours:");
        for entry in hours {
            println!(
                "  {}  {:>5.1}{temp}  {}",
                entry.at.format("%a %H:%M"),
                entry.temperature,
                entry.description
            );
        }
    }
    println!();
}

fn offline_tag(state: &ViewState) -> &'static str {
    if state.is_offline { "  (offline)" } else { "" }
}

fn divider(theme: Theme) -> &'static str {
    match theme {
        Theme::Light => "----------------------------------------",
        Theme::Dark => "========================================",
    }
}
