use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// Unit system forwarded to the weather service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Kelvin, m/s. The service default, so no `units` parameter is sent.
    #[default]
    Standard,
    Metric,
    Imperial,
}

impl Units {
    /// Value for the `units` query parameter, if one should be sent
    pub fn as_query(&self) -> Option<&'static str> {
        match self {
            Self::Standard => None,
            Self::Metric => Some("metric"),
            Self::Imperial => Some("imperial"),
        }
    }
}

/// Weather condition categories mapped from OpenWeatherMap condition ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
    Sleet,
    Thunderstorm,
}

impl WeatherCondition {
    /// Convert an OpenWeatherMap condition id to a WeatherCondition
    /// See: https://openweathermap.org/weather-conditions
    pub fn from_condition_id(id: u16) -> Self {
        match id {
            200..=299 => Self::Thunderstorm,
            300..=399 => Self::Drizzle,
            500 | 501 | 520 | 521 => Self::Rain,
            502..=504 | 522 | 531 => Self::HeavyRain,
            511 | 611..=616 => Self::Sleet, // Freezing rain, sleet
            600..=699 => Self::Snow,
            700..=799 => Self::Fog, // Mist, haze, dust...
            801 | 802 => Self::PartlyCloudy,
            803 | 804 => Self::Cloudy,
            _ => Self::Clear,
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::Snow => "Snow",
            Self::Sleet => "Sleet",
            Self::Thunderstorm => "Thunderstorm",
        }
    }
}

/// Geographic coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when latitude is in [-90, 90] and longitude in [-180, 180].
    /// NaN never passes.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// External endpoints the weather gateway can hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
    Weather,
    Forecast,
    AirPollution,
}

impl EndpointKind {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Forecast => "forecast",
            Self::AirPollution => "air_pollution",
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Current weather conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Place name reported by the provider (may differ from the favorite's name)
    pub location_name: Option<String>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    /// Sea-level pressure in hPa
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_direction: Option<u16>,
    pub condition: WeatherCondition,
    pub description: String,
    pub observed_at: DateTime<Utc>,
}

/// One three-hour forecast step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub condition: WeatherCondition,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub location_name: Option<String>,
    pub entries: Vec<ForecastEntry>,
}

/// Air quality index band (1-5 on the provider's scale)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirQualityLevel {
    Good,
    Fair,
    Moderate,
    Poor,
    VeryPoor,
    Unknown,
}

impl AirQualityLevel {
    pub fn from_index(aqi: u8) -> Self {
        match aqi {
            1 => Self::Good,
            2 => Self::Fair,
            3 => Self::Moderate,
            4 => Self::Poor,
            5 => Self::VeryPoor,
            _ => Self::Unknown,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Moderate => "Moderate",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
            Self::Unknown => "Unknown",
        }
    }
}

/// Pollutant concentrations in μg/m³
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantComponents {
    pub co: f64,
    pub no: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub pm2_5: f64,
    pub pm10: f64,
    pub nh3: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirQualitySample {
    pub time: DateTime<Utc>,
    pub aqi: u8,
    pub level: AirQualityLevel,
    pub components: PollutantComponents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirQuality {
    pub samples: Vec<AirQualitySample>,
}

impl AirQuality {
    /// The most recent sample, if the provider returned any
    pub fn latest(&self) -> Option<&AirQualitySample> {
        self.samples.iter().max_by_key(|s| s.time)
    }
}

/// Normalized result of a gateway fetch, one variant per endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeatherPayload {
    Weather(CurrentWeather),
    Forecast(Forecast),
    AirPollution(AirQuality),
}

impl WeatherPayload {
    pub fn kind(&self) -> EndpointKind {
        match self {
            Self::Weather(_) => EndpointKind::Weather,
            Self::Forecast(_) => EndpointKind::Forecast,
            Self::AirPollution(_) => EndpointKind::AirPollution,
        }
    }
}

/// Weather-overlay dimension selecting a map layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapCriterion {
    Clouds,
    Precipitation,
    SeaLevelPressure,
    WindSpeed,
    Temperature,
}

impl MapCriterion {
    pub const ALL: [MapCriterion; 5] = [
        Self::Clouds,
        Self::Precipitation,
        Self::SeaLevelPressure,
        Self::WindSpeed,
        Self::Temperature,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clouds => "clouds",
            Self::Precipitation => "precipitation",
            Self::SeaLevelPressure => "sea_level_pressure",
            Self::WindSpeed => "wind_speed",
            Self::Temperature => "temperature",
        }
    }

    /// Overlay layer name on the tile service
    pub fn layer_name(&self) -> &'static str {
        match self {
            Self::Clouds => "clouds_new",
            Self::Precipitation => "precipitation_new",
            Self::SeaLevelPressure => "pressure_new",
            Self::WindSpeed => "wind_new",
            Self::Temperature => "temp_new",
        }
    }

    pub fn allowed_list() -> &'static str {
        "clouds, precipitation, sea_level_pressure, wind_speed, temperature"
    }
}

impl FromStr for MapCriterion {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| WeatherError::InvalidCriterion(s.to_string()))
    }
}

impl fmt::Display for MapCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of one overlay tile. Derived per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileAddress {
    pub criterion: MapCriterion,
    pub layer_name: String,
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_thunderstorm() {
        assert_eq!(WeatherCondition::from_condition_id(200), WeatherCondition::Thunderstorm);
        assert_eq!(WeatherCondition::from_condition_id(232), WeatherCondition::Thunderstorm);
    }

    #[test]
    fn test_condition_rain_bands() {
        assert_eq!(WeatherCondition::from_condition_id(300), WeatherCondition::Drizzle);
        assert_eq!(WeatherCondition::from_condition_id(500), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::from_condition_id(502), WeatherCondition::HeavyRain);
        assert_eq!(WeatherCondition::from_condition_id(511), WeatherCondition::Sleet);
    }

    #[test]
    fn test_condition_snow_and_sleet() {
        assert_eq!(WeatherCondition::from_condition_id(600), WeatherCondition::Snow);
        assert_eq!(WeatherCondition::from_condition_id(611), WeatherCondition::Sleet);
        assert_eq!(WeatherCondition::from_condition_id(622), WeatherCondition::Snow);
    }

    #[test]
    fn test_condition_clouds() {
        assert_eq!(WeatherCondition::from_condition_id(741), WeatherCondition::Fog);
        assert_eq!(WeatherCondition::from_condition_id(800), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_condition_id(801), WeatherCondition::PartlyCloudy);
        assert_eq!(WeatherCondition::from_condition_id(804), WeatherCondition::Cloudy);
    }

    #[test]
    fn test_unknown_condition_defaults_to_clear() {
        assert_eq!(WeatherCondition::from_condition_id(0), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_condition_id(999), WeatherCondition::Clear);
    }

    #[test]
    fn test_coordinates_validity() {
        assert!(Coordinates::new(90.0, -180.0).is_valid());
        assert!(Coordinates::new(-90.0, 180.0).is_valid());
        assert!(!Coordinates::new(90.1, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_criterion_layers() {
        assert_eq!(MapCriterion::Clouds.layer_name(), "clouds_new");
        assert_eq!(MapCriterion::Precipitation.layer_name(), "precipitation_new");
        assert_eq!(MapCriterion::SeaLevelPressure.layer_name(), "pressure_new");
        assert_eq!(MapCriterion::WindSpeed.layer_name(), "wind_new");
        assert_eq!(MapCriterion::Temperature.layer_name(), "temp_new");
    }

    #[test]
    fn test_criterion_parse() {
        for criterion in MapCriterion::ALL {
            assert_eq!(criterion.as_str().parse::<MapCriterion>().ok(), Some(criterion));
        }
        assert!(matches!(
            "invalid".parse::<MapCriterion>(),
            Err(WeatherError::InvalidCriterion(c)) if c == "invalid"
        ));
        // Exact match only
        assert!("Clouds".parse::<MapCriterion>().is_err());
    }

    #[test]
    fn test_air_quality_levels() {
        assert_eq!(AirQualityLevel::from_index(1), AirQualityLevel::Good);
        assert_eq!(AirQualityLevel::from_index(5), AirQualityLevel::VeryPoor);
        assert_eq!(AirQualityLevel::from_index(9), AirQualityLevel::Unknown);
        assert_eq!(AirQualityLevel::VeryPoor.description(), "Very Poor");
    }

    #[test]
    fn test_units_query() {
        assert_eq!(Units::Standard.as_query(), None);
        assert_eq!(Units::Metric.as_query(), Some("metric"));
        assert_eq!(Units::Imperial.as_query(), Some("imperial"));
    }

    #[test]
    fn test_payload_kind() {
        let payload = WeatherPayload::AirPollution(AirQuality { samples: vec![] });
        assert_eq!(payload.kind(), EndpointKind::AirPollution);
        assert_eq!(EndpointKind::AirPollution.to_string(), "air_pollution");
    }
}
