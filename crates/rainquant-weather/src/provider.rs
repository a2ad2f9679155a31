//! Open-Meteo daily history client.

use chrono::{Duration as DateDuration, NaiveDate};
use rainquant_core::{NetworkError, ReqwestErrorExt, WeatherConfig};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::normalize::normalize_json;
use crate::types::{Location, Series, WeatherError};

const FORECAST_PATH: &str = "/v1/forecast";
const DAILY_VARIABLES: &str = "precipitation_sum,temperature_2m_max,temperature_2m_min";

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    history_days: u32,
}

impl WeatherProvider {
    pub fn new(base_url: &str, history_days: u32, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ReqwestErrorExt::into_network_error)?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
            history_days,
        })
    }

    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        Self::new(
            &config.api_base_url,
            config.history_days,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Inclusive date window ending on `today`
    pub fn date_window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = today - DateDuration::days(i64::from(self.history_days));
        (start, today)
    }

    /// Fetch the daily history window ending on `today` for a location.
    pub async fn fetch_history(
        &self,
        location: &Location,
        today: NaiveDate,
    ) -> Result<Series, WeatherError> {
        let (start, end) = self.date_window(today);
        self.fetch_range(location, start, end).await
    }

    pub async fn fetch_range(
        &self,
        location: &Location,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Series, WeatherError> {
        let url = format!("{}{}", self.base_url, FORECAST_PATH);
        tracing::debug!(
            "Fetching weather for {}, {} from {} to {}",
            location.latitude,
            location.longitude,
            start,
            end
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("daily", DAILY_VARIABLES.to_string()),
                ("start_date", start.format("%Y-%m-%d").to_string()),
                ("end_date", end.format("%Y-%m-%d").to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Weather provider returned status {}", status);
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        let series = normalize_json(&body)?;
        tracing::info!("Fetched {} days of weather data", series.len());
        Ok(series)
    }
}
