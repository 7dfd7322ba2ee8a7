//! Web Mercator tile addressing for the weather map overlays.
//!
//! No request is made here; the mapper only computes tile indices and the
//! tile URL.

use std::f64::consts::PI;

use crate::error::WeatherError;
use crate::types::{Coordinates, MapCriterion, TileAddress};

pub const TILE_API_URL: &str = "https://tile.openweathermap.org/map";
pub const DEFAULT_ZOOM: u8 = 5;
/// Highest zoom whose tile count still fits in a u32 index
pub const MAX_ZOOM: u8 = 30;

/// Latitude where the Web Mercator square ends
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Tile (x, y) containing the coordinate at `zoom`, both in [0, 2^zoom - 1].
///
/// Latitudes beyond the projection limit are pinned to it so the poles land
/// on the first or last row.
pub fn tile_indices(coords: Coordinates, zoom: u8) -> (u32, u32) {
    let n = f64::from(1u32 << u32::from(zoom.min(MAX_ZOOM)));
    let max_index = n - 1.0;

    let x = ((coords.longitude + 180.0) / 360.0 * n).floor();

    let lat_rad = coords.latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n).floor();

    (
        x.clamp(0.0, max_index) as u32,
        y.clamp(0.0, max_index) as u32,
    )
}

/// Builds overlay tile addresses for a criterion
#[derive(Debug, Clone)]
pub struct TileMapper {
    base_url: String,
    api_key: String,
    default_zoom: u8,
}

impl TileMapper {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            default_zoom: DEFAULT_ZOOM,
        }
    }

    /// Zoom used when the caller does not pass one
    pub fn with_default_zoom(mut self, zoom: u8) -> Self {
        self.default_zoom = zoom;
        self
    }

    pub fn default_zoom(&self) -> u8 {
        self.default_zoom
    }

    /// Map a coordinate and criterion to its overlay tile.
    ///
    /// The criterion is checked before any tile math runs.
    ///
    /// # Errors
    /// `InvalidCriterion` for an unknown criterion, `InvalidInput` for
    /// out-of-range coordinates or a zoom above `MAX_ZOOM`.
    pub fn map_tile(
        &self,
        coords: Coordinates,
        criterion: &str,
        zoom: Option<u8>,
    ) -> Result<TileAddress, WeatherError> {
        let criterion: MapCriterion = criterion.parse()?;
        let zoom = zoom.unwrap_or(self.default_zoom);

        if zoom > MAX_ZOOM {
            return Err(WeatherError::InvalidInput(format!(
                "zoom {} exceeds maximum of {}",
                zoom, MAX_ZOOM
            )));
        }
        if !coords.is_valid() {
            return Err(WeatherError::InvalidInput(format!(
                "coordinates out of range: ({}, {})",
                coords.latitude, coords.longitude
            )));
        }

        let (x, y) = tile_indices(coords, zoom);
        let layer = criterion.layer_name();

        tracing::debug!("Tile for {} at zoom {}: {}/{}/{}", criterion, zoom, layer, x, y);

        Ok(TileAddress {
            criterion,
            layer_name: layer.to_string(),
            zoom,
            x,
            y,
            url: format!(
                "{}/{}/{}/{}/{}.png?appid={}",
                self.base_url, layer, zoom, x, y, self.api_key
            ),
        })
    }
}
