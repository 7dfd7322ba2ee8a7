use std::sync::Arc;

use reqwest::Client;
use tracing::instrument;

use crate::error::WeatherError;
use crate::http;
use crate::types::{
    AirQuality, Coordinates, CurrentWeather, EndpointKind, Forecast, Units, WeatherPayload,
};

pub const DATA_API_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Client for the weather, forecast and air pollution endpoints
#[derive(Debug, Clone)]
pub struct WeatherGateway {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    units: Units,
}

impl WeatherGateway {
    pub fn new(
        client: Arc<Client>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        units: Units,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            units,
        }
    }

    fn query(&self, coords: &Coordinates) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("lat", coords.latitude.to_string()),
            ("lon", coords.longitude.to_string()),
            ("appid", self.api_key.clone()),
        ];
        if let Some(units) = self.units.as_query() {
            query.push(("units", units.to_string()));
        }
        query
    }

    /// Fetch and normalize one endpoint for the given coordinates.
    ///
    /// # Errors
    /// `Upstream` on transport failure, non-2xx status or a body that does
    /// not match the endpoint's schema. Never retried.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(
        &self,
        kind: EndpointKind,
        coords: Coordinates,
    ) -> Result<WeatherPayload, WeatherError> {
        let url = format!("{}/{}", self.base_url, kind.path());
        let query = self.query(&coords);
        let endpoint = kind.path();

        let payload = match kind {
            EndpointKind::Weather => {
                let raw: openweather::CurrentResponse =
                    http::get_json(&self.client, &url, &query, endpoint).await?;
                WeatherPayload::Weather(raw.into())
            }
            EndpointKind::Forecast => {
                let raw: openweather::ForecastResponse =
                    http::get_json(&self.client, &url, &query, endpoint).await?;
                WeatherPayload::Forecast(raw.into())
            }
            EndpointKind::AirPollution => {
                let raw: openweather::AirPollutionResponse =
                    http::get_json(&self.client, &url, &query, endpoint).await?;
                WeatherPayload::AirPollution(raw.into())
            }
        };

        Ok(payload)
    }

    /// Current conditions at the given coordinates.
    pub async fn current(&self, coords: Coordinates) -> Result<CurrentWeather, WeatherError> {
        match self.fetch(EndpointKind::Weather, coords).await? {
            WeatherPayload::Weather(weather) => Ok(weather),
            other => Err(unexpected_payload(EndpointKind::Weather, &other)),
        }
    }

    /// Five-day / three-hour forecast at the given coordinates.
    pub async fn forecast(&self, coords: Coordinates) -> Result<Forecast, WeatherError> {
        match self.fetch(EndpointKind::Forecast, coords).await? {
            WeatherPayload::Forecast(forecast) => Ok(forecast),
            other => Err(unexpected_payload(EndpointKind::Forecast, &other)),
        }
    }

    /// Air pollution indices at the given coordinates.
    pub async fn air_pollution(&self, coords: Coordinates) -> Result<AirQuality, WeatherError> {
        match self.fetch(EndpointKind::AirPollution, coords).await? {
            WeatherPayload::AirPollution(air) => Ok(air),
            other => Err(unexpected_payload(EndpointKind::AirPollution, &other)),
        }
    }
}

fn unexpected_payload(expected: EndpointKind, got: &WeatherPayload) -> WeatherError {
    WeatherError::upstream(
        expected.path(),
        format!("expected {} payload, got {}", expected, got.kind()),
    )
}

/// OpenWeatherMap response structures and conversion into normalized types
mod openweather {
    use chrono::{DateTime, Utc};
    use serde::Deserialize;

    use crate::types::{
        AirQuality, AirQualityLevel, AirQualitySample, CurrentWeather, Forecast, ForecastEntry,
        PollutantComponents, WeatherCondition,
    };

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub id: u16,
        #[serde(default)]
        pub description: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainBlock {
        pub temp: f64,
        #[serde(default)]
        pub feels_like: Option<f64>,
        #[serde(default)]
        pub pressure: Option<f64>,
        #[serde(default)]
        pub humidity: Option<u8>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Wind {
        #[serde(default)]
        pub speed: f64,
        #[serde(default)]
        pub deg: Option<u16>,
    }

    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        pub name: Option<String>,
        pub dt: i64,
        pub main: MainBlock,
        #[serde(default)]
        pub wind: Wind,
        #[serde(default)]
        pub weather: Vec<Condition>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastItem {
        pub dt: i64,
        pub main: MainBlock,
        #[serde(default)]
        pub wind: Wind,
        #[serde(default)]
        pub weather: Vec<Condition>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastCity {
        pub name: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub list: Vec<ForecastItem>,
        pub city: Option<ForecastCity>,
    }

    #[derive(Debug, Deserialize)]
    pub struct AqiBlock {
        pub aqi: u8,
    }

    #[derive(Debug, Deserialize)]
    pub struct PollutionItem {
        pub dt: i64,
        pub main: AqiBlock,
        #[serde(default)]
        pub components: PollutantComponents,
    }

    #[derive(Debug, Deserialize)]
    pub struct AirPollutionResponse {
        #[serde(default)]
        pub list: Vec<PollutionItem>,
    }

    fn timestamp(dt: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(dt, 0).unwrap_or_else(Utc::now)
    }

    /// Condition category and text from the first condition entry
    fn condition(weather: &[Condition]) -> (WeatherCondition, String) {
        match weather.first() {
            Some(c) => {
                let condition = WeatherCondition::from_condition_id(c.id);
                let description = if c.description.is_empty() {
                    condition.description().to_string()
                } else {
                    c.description.clone()
                };
                (condition, description)
            }
            None => (
                WeatherCondition::default(),
                WeatherCondition::default().description().to_string(),
            ),
        }
    }

    impl From<CurrentResponse> for CurrentWeather {
        fn from(raw: CurrentResponse) -> Self {
            let (condition, description) = condition(&raw.weather);
            Self {
                location_name: raw.name.filter(|n| !n.is_empty()),
                temperature: raw.main.temp,
                feels_like: raw.main.feels_like.unwrap_or(raw.main.temp),
                humidity: raw.main.humidity.unwrap_or(0),
                pressure: raw.main.pressure.unwrap_or(0.0),
                wind_speed: raw.wind.speed,
                wind_direction: raw.wind.deg,
                condition,
                description,
                observed_at: timestamp(raw.dt),
            }
        }
    }

    impl From<ForecastResponse> for Forecast {
        fn from(raw: ForecastResponse) -> Self {
            let entries = raw
                .list
                .into_iter()
                .map(|item| {
                    let (condition, description) = condition(&item.weather);
                    ForecastEntry {
                        time: timestamp(item.dt),
                        temperature: item.main.temp,
                        humidity: item.main.humidity.unwrap_or(0),
                        wind_speed: item.wind.speed,
                        condition,
                        description,
                    }
                })
                .collect();

            Self {
                location_name: raw.city.and_then(|c| c.name).filter(|n| !n.is_empty()),
                entries,
            }
        }
    }

    impl From<AirPollutionResponse> for AirQuality {
        fn from(raw: AirPollutionResponse) -> Self {
            let samples = raw
                .list
                .into_iter()
                .map(|item| AirQualitySample {
                    time: timestamp(item.dt),
                    aqi: item.main.aqi,
                    level: AirQualityLevel::from_index(item.main.aqi),
                    components: item.components,
                })
                .collect();

            Self { samples }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AirQualityLevel, WeatherCondition};
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer, units: Units) -> WeatherGateway {
        let client = http::build_client(Duration::from_secs(5)).unwrap();
        WeatherGateway::new(Arc::new(client), server.uri(), "test_key", units)
    }

    fn current_body() -> serde_json::Value {
        serde_json::json!({
            "name": "Paris",
            "dt": 1_700_000_000,
            "main": {"temp": 284.2, "feels_like": 283.1, "pressure": 1012, "humidity": 81},
            "wind": {"speed": 4.6, "deg": 250},
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}]
        })
    }

    #[tokio::test]
    async fn test_current_weather() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("lat", "48.8566"))
            .and(query_param("lon", "2.3522"))
            .and(query_param("appid", "test_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(&mock_server)
            .await;

        let weather = gateway(&mock_server, Units::Standard)
            .current(Coordinates::new(48.8566, 2.3522))
            .await
            .unwrap();

        assert_eq!(weather.location_name.as_deref(), Some("Paris"));
        assert!((weather.temperature - 284.2).abs() < f64::EPSILON);
        assert_eq!(weather.humidity, 81);
        assert!((weather.pressure - 1012.0).abs() < f64::EPSILON);
        assert_eq!(weather.wind_direction, Some(250));
        assert_eq!(weather.condition, WeatherCondition::Rain);
        assert_eq!(weather.description, "light rain");
        assert_eq!(weather.observed_at.timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn test_units_forwarded_when_not_standard() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = gateway(&mock_server, Units::Metric)
            .fetch(EndpointKind::Weather, Coordinates::new(48.8566, 2.3522))
            .await;
        assert!(matches!(result, Ok(WeatherPayload::Weather(_))));
    }

    #[tokio::test]
    async fn test_forecast() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "cod": "200",
                "list": [
                    {
                        "dt": 1_700_000_000,
                        "dt_txt": "2023-11-14 22:13:20",
                        "main": {"temp": 280.0, "humidity": 70},
                        "wind": {"speed": 3.0},
                        "weather": [{"id": 803, "description": "broken clouds"}]
                    },
                    {
                        "dt": 1_700_010_800,
                        "main": {"temp": 279.5, "humidity": 75},
                        "weather": [{"id": 600, "description": "light snow"}]
                    }
                ],
                "city": {"name": "Paris", "country": "FR"}
            })))
            .mount(&mock_server)
            .await;

        let forecast = gateway(&mock_server, Units::Standard)
            .forecast(Coordinates::new(48.8566, 2.3522))
            .await
            .unwrap();

        assert_eq!(forecast.location_name.as_deref(), Some("Paris"));
        assert_eq!(forecast.entries.len(), 2);
        assert_eq!(forecast.entries[0].condition, WeatherCondition::Cloudy);
        assert_eq!(forecast.entries[1].condition, WeatherCondition::Snow);
        assert!((forecast.entries[1].wind_speed - 0.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_air_pollution() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/air_pollution"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "coord": {"lon": 2.3522, "lat": 48.8566},
                "list": [{
                    "dt": 1_700_000_000,
                    "main": {"aqi": 2},
                    "components": {
                        "co": 201.94, "no": 0.02, "no2": 0.77, "o3": 68.66,
                        "so2": 0.64, "pm2_5": 0.5, "pm10": 0.54, "nh3": 0.12
                    }
                }]
            })))
            .mount(&mock_server)
            .await;

        let air = gateway(&mock_server, Units::Standard)
            .air_pollution(Coordinates::new(48.8566, 2.3522))
            .await
            .unwrap();

        let latest = air.latest().unwrap();
        assert_eq!(latest.aqi, 2);
        assert_eq!(latest.level, AirQualityLevel::Fair);
        assert!((latest.components.o3 - 68.66).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = gateway(&mock_server, Units::Standard)
            .current(Coordinates::new(0.0, 0.0))
            .await;

        match result {
            Err(WeatherError::Upstream {
                endpoint, status, ..
            }) => {
                assert_eq!(endpoint, "weather");
                assert_eq!(status, Some(503));
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_upstream_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "weather": "sunny"
            })))
            .mount(&mock_server)
            .await;

        let result = gateway(&mock_server, Units::Standard)
            .forecast(Coordinates::new(0.0, 0.0))
            .await;
        assert!(matches!(result, Err(WeatherError::Upstream { status: None, .. })));
    }
}
