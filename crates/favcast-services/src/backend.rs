//! Favorites storage backend trait and error types.
//!
//! This module defines the `FavoritesBackend` trait that abstracts over the
//! in-memory and SQLite registries.

use favcast_weather::WeatherError;
use thiserror::Error;

use crate::favorite::{FavoriteLocation, UserId};

/// Errors that can occur during favorites operations.
#[derive(Debug, Error)]
pub enum FavoritesError {
    /// (user_id, city_name) is already registered.
    #[error("City {city_name} is already in favorites for user {user_id}")]
    Duplicate { user_id: UserId, city_name: String },

    /// (user_id, city_name) is not registered.
    #[error("City {city_name} is not in favorites for user {user_id}")]
    NotFound { user_id: UserId, city_name: String },

    #[error("Invalid coordinates: ({latitude}, {longitude}) must be within [-90, 90] and [-180, 180]")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// Rejected input such as an empty city name.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage error (database, lock, worker thread).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Geocoding, weather or tile lookup failure.
    #[error(transparent)]
    Weather(#[from] WeatherError),
}

impl FavoritesError {
    pub fn duplicate(user_id: UserId, city_name: impl Into<String>) -> Self {
        Self::Duplicate {
            user_id,
            city_name: city_name.into(),
        }
    }

    pub fn not_found(user_id: UserId, city_name: impl Into<String>) -> Self {
        Self::NotFound {
            user_id,
            city_name: city_name.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// True for a missing favorite and for a city geocoding could not find.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Weather(WeatherError::NotFound(_))
        )
    }
}

/// Result type for favorites operations.
pub type FavoritesResult<T> = Result<T, FavoritesError>;

/// Trait for favorites storage backends.
///
/// Entries for a user are returned in insertion order. Implementations don't
/// need to be Sync; `FavoritesStore` handles shared access.
pub trait FavoritesBackend: Send {
    /// Append a favorite.
    ///
    /// # Errors
    /// Returns `FavoritesError::Duplicate` if (user_id, city_name) exists.
    fn add(&self, favorite: FavoriteLocation) -> FavoritesResult<()>;

    /// Remove the single entry matching (user_id, city_name).
    ///
    /// # Errors
    /// Returns `FavoritesError::NotFound` if there is no such entry.
    fn remove(&self, user_id: UserId, city_name: &str) -> FavoritesResult<()>;

    /// All favorites of a user; empty if the user has none.
    fn list(&self, user_id: UserId) -> FavoritesResult<Vec<FavoriteLocation>>;

    /// Look up one favorite.
    ///
    /// Default implementation is a linear scan over `list`.
    fn get(&self, user_id: UserId, city_name: &str) -> FavoritesResult<FavoriteLocation> {
        self.list(user_id)?
            .into_iter()
            .find(|f| f.city_name == city_name)
            .ok_or_else(|| FavoritesError::not_found(user_id, city_name))
    }

    /// Whether (user_id, city_name) is registered.
    fn contains(&self, user_id: UserId, city_name: &str) -> FavoritesResult<bool> {
        match self.get(user_id, city_name) {
            Ok(_) => Ok(true),
            Err(FavoritesError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
