//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - Configuration & credential handling
//! - The OpenWeatherMap client and its failure taxonomy
//! - Durable history / preference stores
//! - The query controller reconciling everything into one view state
//!
//! It is used by `dashboard-cli`, but can also be reused by other
//! front-ends or services.

pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod model;
pub mod prefs;
pub mod provider;

pub use config::{Config, StoragePaths};
pub use controller::{QueryController, ViewState};
pub use error::WeatherError;
pub use history::HistoryStore;
pub use model::{CurrentWeather, ForecastDay, ForecastEntry, LocationQuery, Theme};
pub use prefs::PreferenceStore;
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
