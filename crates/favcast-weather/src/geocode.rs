//! Forward geocoding: turn a city name into coordinates.
//! Uses the OpenWeatherMap direct geocoding endpoint, first match wins.

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::error::WeatherError;
use crate::http;
use crate::types::Coordinates;

pub const GEO_API_URL: &str = "http://api.openweathermap.org/geo/1.0";

#[derive(Debug, Deserialize)]
struct GeocodingMatch {
    lat: Option<f64>,
    lon: Option<f64>,
    #[allow(dead_code)]
    name: Option<String>,
    #[allow(dead_code)]
    country: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CoordinateResolver {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl CoordinateResolver {
    pub fn new(client: Arc<Client>, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Resolve a city name to the coordinates of its first geocoding match.
    ///
    /// # Errors
    /// `NotFound` when the service has no match, `IncompleteData` when the
    /// match lacks latitude or longitude, `Upstream` on transport or status
    /// failures.
    #[instrument(skip(self), level = "info")]
    pub async fn resolve(&self, city_name: &str) -> Result<Coordinates, WeatherError> {
        let url = format!("{}/direct", self.base_url);
        let query = [
            ("q", city_name.to_string()),
            ("limit", "1".to_string()),
            ("appid", self.api_key.clone()),
        ];

        let matches: Vec<GeocodingMatch> =
            http::get_json(&self.client, &url, &query, "geocoding").await?;

        let Some(first) = matches.into_iter().next() else {
            tracing::error!(city = city_name, "No coordinates found");
            return Err(WeatherError::NotFound(city_name.to_string()));
        };

        match (first.lat, first.lon) {
            (Some(latitude), Some(longitude)) => {
                tracing::info!(
                    "Resolved {} to ({:.4}, {:.4})",
                    city_name,
                    latitude,
                    longitude
                );
                Ok(Coordinates::new(latitude, longitude))
            }
            _ => {
                tracing::error!(city = city_name, "Incomplete data returned by geocoding");
                Err(WeatherError::IncompleteData(city_name.to_string()))
            }
        }
    }
}
