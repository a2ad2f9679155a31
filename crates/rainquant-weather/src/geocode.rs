//! Reverse geocoding: convert coordinates to human-readable place names.
//! Uses the BigDataCloud client endpoint - free, no API key required.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::types::Location;

const REVERSE_PATH: &str = "/data/reverse-geocode-client";
const USER_AGENT: &str = "RainQuant/0.1.0";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReverseGeocodeResponse {
    city: Option<String>,
    principal_subdivision: Option<String>,
    locality: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    client: Option<Client>,
    base_url: String,
}

impl ReverseGeocoder {
    /// Build a geocoder. A client that fails to build leaves the geocoder in
    /// coordinate-only mode rather than failing the caller.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = match Client::builder().timeout(timeout).user_agent(USER_AGENT).build() {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!("Failed to create geocoding client: {}", e);
                None
            }
        };

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Best-effort place name for a location. Never fails: any error degrades
    /// to a 4-decimal coordinate string.
    pub async fn place_name(&self, location: &Location) -> String {
        if let Some(name) = location.name.as_ref().filter(|n| !n.is_empty()) {
            return name.clone();
        }

        match self.lookup(location).await {
            Some(name) => {
                tracing::info!("Reverse geocoded to: {}", name);
                name
            }
            None => location.coordinate_label(4),
        }
    }

    /// Query the provider. `None` on transport, status or parse failure.
    async fn lookup(&self, location: &Location) -> Option<String> {
        let client = self.client.as_ref()?;
        let url = format!("{}{}", self.base_url, REVERSE_PATH);

        let response = match client
            .get(&url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("localityLanguage", "en".to_string()),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Reverse geocode request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", response.status());
            return None;
        }

        let body: ReverseGeocodeResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reverse geocode parse error: {}", e);
                return None;
            }
        };

        Some(format_place(body, location))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn format_place(body: ReverseGeocodeResponse, location: &Location) -> String {
    match (non_empty(body.city), non_empty(body.principal_subdivision)) {
        (Some(city), Some(region)) => format!("{}, {}", city, region),
        _ => non_empty(body.locality).unwrap_or_else(|| location.coordinate_label(2)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(city: Option<&str>, region: Option<&str>, locality: Option<&str>) -> ReverseGeocodeResponse {
        ReverseGeocodeResponse {
            city: city.map(String::from),
            principal_subdivision: region.map(String::from),
            locality: locality.map(String::from),
        }
    }

    #[test]
    fn test_city_and_region() {
        let loc = Location::new(32.7157, -117.1611);
        let name = format_place(body(Some("San Diego"), Some("California"), None), &loc);
        assert_eq!(name, "San Diego, California");
    }

    #[test]
    fn test_locality_when_city_missing() {
        let loc = Location::new(32.7157, -117.1611);
        let name = format_place(body(None, Some("California"), Some("Coronado")), &loc);
        assert_eq!(name, "Coronado");
    }

    #[test]
    fn test_empty_strings_fall_back_to_coordinates() {
        let loc = Location::new(32.715736, -117.161087);
        let name = format_place(body(Some(""), Some(""), Some(" ")), &loc);
        assert_eq!(name, "32.72, -117.16");
    }

    #[tokio::test]
    async fn test_preserves_existing_name() {
        let geocoder = ReverseGeocoder::new("http://127.0.0.1:1", Duration::from_millis(50));
        let loc = Location::new(47.6062, -122.3321).with_name("Seattle");
        assert_eq!(geocoder.place_name(&loc).await, "Seattle");
    }

    #[tokio::test]
    async fn test_unreachable_provider_degrades_to_coordinates() {
        let geocoder = ReverseGeocoder::new("http://127.0.0.1:1", Duration::from_millis(200));
        let loc = Location::new(47.6062, -122.3321);
        assert_eq!(geocoder.place_name(&loc).await, "47.6062, -122.3321");
    }
}
