//! Favorite location records.

use favcast_weather::Coordinates;
use serde::{Deserialize, Serialize};

use crate::backend::{FavoritesError, FavoritesResult};

/// Identifier handed over by the account/session service. Trusted as given.
pub type UserId = i64;

/// A user-scoped named location with coordinates.
///
/// At most one per (user_id, city_name); city names compare exactly,
/// case-sensitive and without trimming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteLocation {
    pub user_id: UserId,
    pub city_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl FavoriteLocation {
    /// Create a validated favorite.
    ///
    /// # Errors
    /// `InvalidInput` for an empty city name, `InvalidCoordinates` when latitude
    /// is outside [-90, 90] or longitude outside [-180, 180].
    pub fn new(
        user_id: UserId,
        city_name: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> FavoritesResult<Self> {
        let favorite = Self {
            user_id,
            city_name: city_name.into(),
            latitude,
            longitude,
        };
        favorite.validate()?;
        Ok(favorite)
    }

    /// Check the city name and coordinate ranges.
    ///
    /// Registries call this on every insert.
    ///
    /// # Errors
    /// Same as [`FavoriteLocation::new`].
    pub fn validate(&self) -> FavoritesResult<()> {
        validate_city_name(&self.city_name)?;

        if !self.coordinates().is_valid() {
            return Err(FavoritesError::InvalidCoordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }
        Ok(())
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Exact (user, city) match
    pub fn matches(&self, user_id: UserId, city_name: &str) -> bool {
        self.user_id == user_id && self.city_name == city_name
    }
}

/// Maximum city name length accepted for a favorite.
pub const MAX_CITY_NAME_LENGTH: usize = 200;

/// Validate a city name.
///
/// # Errors
/// Returns `FavoritesError::InvalidInput` if the name is empty, whitespace-only
/// or longer than `MAX_CITY_NAME_LENGTH` characters.
pub fn validate_city_name(city_name: &str) -> FavoritesResult<()> {
    if city_name.trim().is_empty() {
        return Err(FavoritesError::invalid_input("City name cannot be empty"));
    }

    if city_name.chars().count() > MAX_CITY_NAME_LENGTH {
        return Err(FavoritesError::invalid_input(format!(
            "City name exceeds maximum length of {} characters",
            MAX_CITY_NAME_LENGTH
        )));
    }

    Ok(())
}
