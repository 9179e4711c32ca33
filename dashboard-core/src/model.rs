use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Forecast rollups never cover more than this many calendar days.
pub const FORECAST_DAY_LIMIT: usize = 5;

/// A validated location query: trimmed, never empty.
#[derive(Debug, Clone)]
pub struct LocationQuery(String);

impl LocationQuery {
    /// Returns `None` for empty or whitespace-only input.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison, used to suppress redundant fetches for
    /// queries that differ only by case or surrounding whitespace.
    pub fn matches(&self, other: &LocationQuery) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current conditions for a location, as returned by the weather service.
///
/// Temperatures keep full precision; rounding happens at render time only.
/// Snapshots of this struct are what the history store persists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub location_name: String,
    pub country_code: Option<String>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub condition_main: String,
    pub condition_description: String,
    pub icon_code: String,
    pub observed_at: DateTime<Utc>,
}

/// One 3-hour forecast sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f64,
    pub condition_main: String,
    pub icon_code: String,
}

/// Calendar-day rollup of forecast samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub avg_temp_c: f64,
    /// Most frequent `condition_main` among the day's samples.
    pub condition_main: String,
    /// Icon of the first sample carrying the dominant condition.
    pub icon_code: String,
}

/// Display preference persisted across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
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
        match value.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(anyhow::anyhow!(
                "Unknown theme '{value}'. Supported themes: light, dark."
            )),
        }
    }
}

/// Group 3-hour samples into calendar days on the UTC date boundary.
///
/// Each day gets the plain mean of its sample temperatures and the most
/// frequent `condition_main`, ties broken by first-encountered order. At
/// most [`FORECAST_DAY_LIMIT`] days are returned, date ascending. An empty
/// sample list yields an empty rollup.
pub fn group_forecast_days(entries: &[ForecastEntry]) -> Vec<ForecastDay> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&ForecastEntry>> = BTreeMap::new();
    for entry in entries {
        by_day
            .entry(entry.timestamp.date_naive())
            .or_default()
            .push(entry);
    }

    by_day
        .into_iter()
        .take(FORECAST_DAY_LIMIT)
        .map(|(date, samples)| {
            let avg_temp_c =
                samples.iter().map(|s| s.temperature_c).sum::<f64>() / samples.len() as f64;
            let dominant = dominant_condition(&samples);
            let icon_code = samples
                .iter()
                .find(|s| s.condition_main == dominant)
                .map(|s| s.icon_code.clone())
                .unwrap_or_default();

            ForecastDay {
                date,
                avg_temp_c,
                condition_main: dominant.to_string(),
                icon_code,
            }
        })
        .collect()
}

/// Most frequent condition; strict `>` keeps the first-encountered one on
/// ties.
fn dominant_condition<'a>(samples: &[&'a ForecastEntry]) -> &'a str {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for sample in samples {
        match counts
            .iter_mut()
            .find(|(condition, _)| *condition == sample.condition_main)
        {
            Some((_, n)) => *n += 1,
            None => counts.push((&sample.condition_main, 1)),
        }
    }

    counts
        .into_iter()
        .fold(("", 0), |best, (condition, n)| {
            if n > best.1 { (condition, n) } else { best }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(ts: DateTime<Utc>, temp: f64, condition: &str) -> ForecastEntry {
        ForecastEntry {
            timestamp: ts,
            temperature_c: temp,
            condition_main: condition.to_string(),
            icon_code: format!("{}-icon", condition.to_lowercase()),
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn query_is_trimmed() {
        let q = LocationQuery::new("  Paris  ").unwrap();
        assert_eq!(q.as_str(), "Paris");
    }

    #[test]
    fn empty_query_is_rejected() {
        assert!(LocationQuery::new("").is_none());
        assert!(LocationQuery::new("   ").is_none());
    }

    #[test]
    fn query_matching_ignores_case() {
        let a = LocationQuery::new("London").unwrap();
        let b = LocationQuery::new("  LONDON ").unwrap();
        let c = LocationQuery::new("Tokyo").unwrap();
        assert!(a.matches(&b));
        assert!(!a.matches(&c));
    }

    #[test]
    fn day_temperatures_are_averaged() {
        let entries = vec![
            entry(at(1, 6), 10.0, "Clouds"),
            entry(at(1, 9), 12.0, "Clouds"),
            entry(at(1, 12), 14.0, "Clouds"),
        ];

        let days = group_forecast_days(&entries);
        assert_eq!(days.len(), 1);
        assert!((days[0].avg_temp_c - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn dominant_condition_wins_by_count() {
        let entries = vec![
            entry(at(1, 6), 10.0, "Rain"),
            entry(at(1, 9), 11.0, "Clouds"),
            entry(at(1, 12), 12.0, "Clouds"),
        ];

        let days = group_forecast_days(&entries);
        assert_eq!(days[0].condition_main, "Clouds");
        assert_eq!(days[0].icon_code, "clouds-icon");
    }

    #[test]
    fn condition_ties_go_to_first_encountered() {
        let entries = vec![
            entry(at(1, 6), 10.0, "Rain"),
            entry(at(1, 9), 11.0, "Clouds"),
            entry(at(1, 12), 12.0, "Clouds"),
            entry(at(1, 15), 13.0, "Rain"),
        ];

        let days = group_forecast_days(&entries);
        assert_eq!(days[0].condition_main, "Rain");
    }

    #[test]
    fn days_are_capped_and_ascending() {
        let entries: Vec<ForecastEntry> = (1..=7)
            .map(|day| entry(at(day, 12), f64::from(day), "Clear"))
            .collect();

        let days = group_forecast_days(&entries);
        assert_eq!(days.len(), FORECAST_DAY_LIMIT);
        for window in days.windows(2) {
            assert!(window[0].date < window[1].date);
        }
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn samples_split_on_utc_midnight() {
        let entries = vec![
            entry(at(1, 23), 5.0, "Clear"),
            entry(at(2, 1), 7.0, "Clear"),
        ];

        let days = group_forecast_days(&entries);
        assert_eq!(days.len(), 2);
        assert!((days[0].avg_temp_c - 5.0).abs() < f64::EPSILON);
        assert!((days[1].avg_temp_c - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_forecast_yields_empty_rollup() {
        assert!(group_forecast_days(&[]).is_empty());
    }

    #[test]
    fn theme_parses_and_toggles() {
        assert_eq!(Theme::try_from("dark").unwrap(), Theme::Dark);
        assert_eq!(Theme::try_from(" LIGHT ").unwrap(), Theme::Light);
        assert!(Theme::try_from("sepia").is_err());
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }
}
