use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    error::WeatherError,
    model::{self, CurrentWeather, ForecastDay, ForecastEntry, LocationQuery},
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Shared deadline for both calls of a fetch cycle.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// OpenWeatherMap client: current conditions plus the 5-day/3-hour
/// forecast, metric units.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Result<Self, WeatherError> {
        Self::with_timeout(api_key, REQUEST_TIMEOUT)
    }

    /// Client with a custom per-request deadline.
    pub fn with_timeout(api_key: String, timeout: Duration) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| WeatherError::Unexpected(err.to_string()))?;

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http,
        })
    }

    /// Point the client at a different service root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_current(&self, query: &LocationQuery) -> Result<CurrentWeather, WeatherError> {
        let url = format!("{}/weather", self.base_url);
        let body = self.get_checked(&url, query).await?;

        let parsed: OwCurrentResponse = serde_json::from_str(&body).map_err(|err| {
            WeatherError::Unexpected(format!("malformed current-weather response: {err}"))
        })?;

        Ok(parsed.into_current_weather())
    }

    async fn fetch_forecast(&self, query: &LocationQuery) -> Result<Vec<ForecastDay>, WeatherError> {
        let url = format!("{}/forecast", self.base_url);
        let body = self.get_checked(&url, query).await?;

        let parsed: OwForecastResponse = serde_json::from_str(&body).map_err(|err| {
            WeatherError::Unexpected(format!("malformed forecast response: {err}"))
        })?;

        let entries: Vec<ForecastEntry> = parsed
            .list
            .into_iter()
            .map(OwForecastSample::into_entry)
            .collect();

        Ok(model::group_forecast_days(&entries))
    }

    /// Issue one GET and classify every non-success outcome.
    async fn get_checked(&self, url: &str, query: &LocationQuery) -> Result<String, WeatherError> {
        let res = self
            .http
            .get(url)
            .query(&[
                ("q", query.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|err| classify_transport(&err))?;

        let status = res.status();
        let body = res.text().await.map_err(|err| classify_transport(&err))?;

        if status.is_success() {
            return Ok(body);
        }

        tracing::debug!(
            "weather request to {url} failed with {status}: {}",
            truncate_body(&body)
        );
        Err(classify_status(status, &body, query))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_and_forecast(
        &self,
        query: &LocationQuery,
    ) -> Result<(CurrentWeather, Vec<ForecastDay>), WeatherError> {
        // Current conditions first: they are the priority result and must
        // succeed before the caller may record history.
        let current = self.fetch_current(query).await?;
        let forecast = self.fetch_forecast(query).await?;

        Ok((current, forecast))
    }
}

fn classify_status(status: StatusCode, body: &str, query: &LocationQuery) -> WeatherError {
    match status {
        StatusCode::UNAUTHORIZED => WeatherError::Unauthorized,
        StatusCode::NOT_FOUND => WeatherError::NotFound(query.to_string()),
        s if s.is_server_error() => WeatherError::ServerError(s.as_u16()),
        s => WeatherError::ClientError {
            status: s.as_u16(),
            message: error_message(body),
        },
    }
}

fn classify_transport(err: &reqwest::Error) -> WeatherError {
    if err.is_timeout() {
        WeatherError::Timeout
    } else if err.is_connect() || err.is_request() {
        WeatherError::NetworkUnreachable
    } else {
        WeatherError::Unexpected(err.to_string())
    }
}

/// OpenWeatherMap error bodies carry a `message` field.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "Failed to fetch weather.".to_string())
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[derive(Debug, Default, Deserialize)]
struct OwMain {
    #[serde(default)]
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    #[serde(default)]
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    dt: Option<i64>,
    #[serde(default)]
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    sys: OwSys,
}

impl OwCurrentResponse {
    /// Build the domain value, substituting fallbacks for absent fields.
    fn into_current_weather(self) -> CurrentWeather {
        let (condition_main, condition_description, icon_code) =
            match self.weather.into_iter().next() {
                Some(w) => (
                    non_empty_or(w.main, "Unknown"),
                    non_empty_or(w.description, "No description"),
                    w.icon,
                ),
                None => (
                    "Unknown".to_string(),
                    "No description".to_string(),
                    String::new(),
                ),
            };

        CurrentWeather {
            location_name: non_empty_or(self.name, "Unknown location"),
            country_code: self.sys.country.filter(|c| !c.is_empty()),
            temperature_c: self.main.temp,
            feels_like_c: self.main.feels_like,
            humidity_pct: self.main.humidity,
            wind_speed_mps: self.wind.speed,
            condition_main,
            condition_description,
            icon_code,
            observed_at: self
                .dt
                .and_then(|ts| DateTime::from_timestamp(ts, 0))
                .unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastSample {
    dt: i64,
    #[serde(default)]
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

impl OwForecastSample {
    fn into_entry(self) -> ForecastEntry {
        let (condition_main, icon_code) = match self.weather.into_iter().next() {
            Some(w) => (non_empty_or(w.main, "Unknown"), w.icon),
            None => ("Unknown".to_string(), String::new()),
        };

        ForecastEntry {
            timestamp: DateTime::from_timestamp(self.dt, 0).unwrap_or_else(Utc::now),
            temperature_c: self.main.temp,
            condition_main,
            icon_code,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    #[serde(default)]
    list: Vec<OwForecastSample>,
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}
