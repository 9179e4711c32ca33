use dashboard_core::{CurrentWeather, ForecastDay, ViewState};

/// Print the dashboard body for the current view state.
pub fn view_state(view: &ViewState) {
    match view {
        ViewState::Idle { message } => println!("{message}"),
        ViewState::Loading => println!("Loading..."),
        ViewState::Error { message } => println!("Error: {message}"),
        ViewState::Success { current, forecast } => {
            weather_card(current);
            forecast_days(forecast);
        }
    }
}

/// Current-conditions card. Temperatures are rounded here only; the domain
/// values keep full precision.
pub fn weather_card(current: &CurrentWeather) {
    let location = match current.country_code.as_deref() {
        Some(country) => format!("{}, {country}", current.location_name),
        None => current.location_name.clone(),
    };

    println!();
    println!("{location}");
    println!(
        "  {}°C  {}",
        current.temperature_c.round() as i64,
        capitalize_words(&current.condition_description)
    );
    println!("  Feels like {}°C", current.feels_like_c.round() as i64);
    println!("  Humidity   {}%", current.humidity_pct);
    println!("  Wind       {:.1} m/s", current.wind_speed_mps);
    println!(
        "  Observed   {}",
        current.observed_at.format("%Y-%m-%d %H:%M UTC")
    );
}

pub fn forecast_days(days: &[ForecastDay]) {
    if days.is_empty() {
        return;
    }

    println!();
    println!("5-day forecast:");
    for day in days {
        println!(
            "  {}  {:>3}°C  {}",
            day.date.format("%a %b %d"),
            day.avg_temp_c.round() as i64,
            day.condition_main.to_lowercase()
        );
    }
}

pub fn history(entries: &[CurrentWeather]) {
    if entries.is_empty() {
        println!("No recent searches.");
        return;
    }

    println!();
    println!("Recent searches:");
    for entry in entries {
        println!(
            "  {}  {}°C  {}",
            entry.location_name,
            entry.temperature_c.round() as i64,
            entry.condition_description
        );
    }
}

fn capitalize_words(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_words_are_capitalized() {
        assert_eq!(capitalize_words("scattered clouds"), "Scattered Clouds");
        assert_eq!(capitalize_words(""), "");
    }
}
