//! Forward geocoding through the Google Geocoding API.
//!
//! Constructed only when an API key is configured; everything degrades to
//! "no coordinates" without one.

use hestia_common::{AppError, AppResult};
use serde::Deserialize;

/// A geocoded point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Geocoding service.
#[derive(Clone)]
pub struct GeocodingService {
    api_key: String,
    http_client: reqwest::Client,
}

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl GeocodingService {
    /// Create a new geocoding service.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http_client: reqwest::Client::new(),
        }
    }

    /// Geocode a free-form address. Returns `None` when nothing matches.
    pub async fn geocode(&self, query: &str) -> AppResult<Option<GeoPoint>> {
        let response = self
            .http_client
            .get("https://maps.googleapis.com/maps/api/geocode/json")
            .query(&[("address", query), ("key", &self.api_key)])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Geocoding request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Geocoding returned HTTP {}",
                response.status()
            )));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Malformed geocoding response: {e}")))?;

        match body.status.as_str() {
            "OK" => Ok(body.results.first().map(|r| GeoPoint {
                latitude: r.geometry.location.lat,
                longitude: r.geometry.location.lng,
            })),
            "ZERO_RESULTS" => Ok(None),
            other => Err(AppError::ExternalService(format!(
                "Geocoding failed with status {other}"
            ))),
        }
    }
}
