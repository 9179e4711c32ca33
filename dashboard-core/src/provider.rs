use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::WeatherError,
    model::{CurrentWeather, ForecastDay, LocationQuery},
};

pub mod openweather;

/// Seam between the query controller and the remote weather service.
///
/// Implementations own transport, timeout and failure classification; the
/// controller only sees domain values or a [`WeatherError`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch current conditions and the daily forecast rollup for a
    /// location as one logical operation. Forecast is best-effort in the
    /// sense that an empty remote list yields an empty rollup, not an
    /// error; no retries happen at this layer.
    async fn current_and_forecast(
        &self,
        query: &LocationQuery,
    ) -> Result<(CurrentWeather, Vec<ForecastDay>), WeatherError>;
}
