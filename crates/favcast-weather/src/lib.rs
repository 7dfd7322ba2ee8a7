//! Weather side of Favcast
//!
//! Geocoding, weather/forecast/air-pollution lookups and map-overlay tile
//! addressing against an OpenWeatherMap-compatible service.

pub mod error;
pub mod geocode;
pub mod http;
pub mod provider;
pub mod tiles;
pub mod types;

pub use error::WeatherError;
pub use geocode::{CoordinateResolver, GEO_API_URL};
pub use http::{build_client, DEFAULT_TIMEOUT_SECS};
pub use provider::{WeatherGateway, DATA_API_URL};
pub use tiles::{tile_indices, TileMapper, DEFAULT_ZOOM, MAX_ZOOM, TILE_API_URL};
pub use types::*;
