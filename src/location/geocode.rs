use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const MAPS_CO_SEARCH_URL: &str = "https://geocode.maps.co/search";

/// Outcome of a geocoding lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeocodeResult {
    pub success: bool,
    pub formatted_address: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub error: Option<String>,
}

impl GeocodeResult {
    pub fn found(formatted_address: String, lat: f64, lon: f64) -> Self {
        Self {
            success: true,
            formatted_address: Some(formatted_address),
            lat: Some(lat),
            lon: Some(lon),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Address lookup collaborator. Lookups report failure in the result rather
/// than erroring.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> GeocodeResult;
}

/// Geocoder backed by the geocode.maps.co search API
pub struct MapsCoGeocoder {
    client: Client,
    api_key: String,
    timeout: Duration,
}

impl MapsCoGeocoder {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            api_key,
            timeout,
        }
    }

    async fn search(&self, address: &str) -> Result<Vec<MapsCoHit>, String> {
        let response = self
            .client
            .get(MAPS_CO_SEARCH_URL)
            .query(&[("q", address), ("api_key", self.api_key.as_str())])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| format!("Geocoding request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Geocoding API error: {}", response.status()));
        }

        response
            .json::<Vec<MapsCoHit>>()
            .await
            .map_err(|e| format!("Failed to parse geocoding response: {}", e))
    }
}

#[async_trait]
impl Geocoder for MapsCoGeocoder {
    async fn geocode(&self, address: &str) -> GeocodeResult {
        let hits = match self.search(address).await {
            Ok(hits) => hits,
            Err(e) => return GeocodeResult::failed(e),
        };

        let Some(hit) = hits.into_iter().next() else {
            return GeocodeResult::failed(format!("No results found for address: {}", address));
        };

        match (hit.lat.parse::<f64>(), hit.lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) => GeocodeResult::found(hit.display_name, lat, lon),
            _ => GeocodeResult::failed(format!(
                "Invalid coordinates in geocoding result: {}, {}",
                hit.lat, hit.lon
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MapsCoHit {
    display_name: String,
    lat: String,
    lon: String,
}

/// Used when no geocoding key is configured
pub struct DisabledGeocoder;

#[async_trait]
impl Geocoder for DisabledGeocoder {
    async fn geocode(&self, _address: &str) -> GeocodeResult {
        GeocodeResult::failed("Geocoding API key not configured")
    }
}

/// Test geocoder that answers every lookup with the same result
#[cfg(test)]
pub struct FixedGeocoder {
    pub result: GeocodeResult,
    pub lookups: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl FixedGeocoder {
    pub fn new(result: GeocodeResult) -> Self {
        Self {
            result,
            lookups: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn geocode(&self, address: &str) -> GeocodeResult {
        self.lookups.lock().unwrap().push(address.to_string());
        self.result.clone()
    }
}
