//! Turns the provider's parallel daily arrays into a typed [`Series`].
//!
//! Open-Meteo answers with one array per variable, correlated by index.
//! Shapes are checked up front so a short array is reported as a malformed
//! payload instead of being indexed out of bounds.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::types::{DailyRecord, Series, WeatherError};

/// Top-level forecast response. Only the `daily` block is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastResponse {
    pub daily: Option<DailyPayload>,
}

/// Parallel arrays keyed by `time`. Entries may be `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyPayload {
    pub time: Option<Vec<String>>,
    pub precipitation_sum: Option<Vec<Option<f64>>>,
    pub temperature_2m_max: Option<Vec<Option<f64>>>,
    pub temperature_2m_min: Option<Vec<Option<f64>>>,
}

/// Parse a raw response body and normalize it.
pub fn normalize_json(body: &str) -> Result<Series, WeatherError> {
    let response: ForecastResponse = serde_json::from_str(body)
        .map_err(|e| WeatherError::malformed(format!("invalid JSON: {}", e)))?;
    normalize(&response)
}

/// Build one record per entry of `daily.time`, in provider order.
pub fn normalize(response: &ForecastResponse) -> Result<Series, WeatherError> {
    let daily = response
        .daily
        .as_ref()
        .ok_or_else(|| WeatherError::malformed("response has no daily block"))?;
    let dates = daily
        .time
        .as_ref()
        .ok_or_else(|| WeatherError::malformed("daily block has no time array"))?;
    let n = dates.len();

    check_len("precipitation_sum", daily.precipitation_sum.as_deref(), n)?;
    check_len("temperature_2m_max", daily.temperature_2m_max.as_deref(), n)?;
    check_len("temperature_2m_min", daily.temperature_2m_min.as_deref(), n)?;

    let mut records = Vec::with_capacity(n);
    for (i, raw_date) in dates.iter().enumerate() {
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|e| {
            WeatherError::malformed(format!("time[{}] = {:?} is not a date: {}", i, raw_date, e))
        })?;

        let precipitation_mm = value_at(daily.precipitation_sum.as_deref(), i)
            .unwrap_or(0.0)
            .max(0.0);

        records.push(DailyRecord {
            temperature_max_c: daily
                .temperature_2m_max
                .as_deref()
                .map(|values| values[i].unwrap_or(0.0)),
            temperature_min_c: daily
                .temperature_2m_min
                .as_deref()
                .map(|values| values[i].unwrap_or(0.0)),
            ..DailyRecord::new(date, precipitation_mm)
        });
    }

    tracing::debug!("Normalized {} daily records", records.len());
    Ok(Series::new(records))
}

fn check_len(field: &str, values: Option<&[Option<f64>]>, expected: usize) -> Result<(), WeatherError> {
    match values {
        Some(values) if values.len() != expected => Err(WeatherError::malformed(format!(
            "{} has {} entries but time has {}",
            field,
            values.len(),
            expected
        ))),
        _ => Ok(()),
    }
}

fn value_at(values: Option<&[Option<f64>]>, i: usize) -> Option<f64> {
    values.and_then(|v| v[i]).filter(|v| v.is_finite())
}
