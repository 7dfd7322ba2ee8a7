//! Centralized error types for the Favcast application.
//!
//! This module provides a typed error hierarchy that:
//! - Maps every service failure to a user-facing message
//! - Maps every service failure to the HTTP-style status a routing layer uses
//! - Preserves full error context for debugging/logging

use favcast_services::FavoritesError;
use favcast_weather::WeatherError;
use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` for display and `status_code()` at the boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Favorites(#[from] FavoritesError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl From<WeatherError> for AppError {
    fn from(error: WeatherError) -> Self {
        AppError::Favorites(FavoritesError::Weather(error))
    }
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Favorites(e) => favorites_user_message(e),
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }

    /// HTTP-style status for this error.
    ///
    /// Duplicate → 409, missing favorite or city → 404, rejected input → 400,
    /// upstream failure → 502, storage and local failures → 500.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Favorites(e) => favorites_status_code(e),
            AppError::Config(_) | AppError::Io(_) | AppError::Other(_) => 500,
        }
    }
}

fn favorites_user_message(error: &FavoritesError) -> &'static str {
    match error {
        FavoritesError::Duplicate { .. } => "This city is already in your favorites.",
        FavoritesError::NotFound { .. } => "This city is not in your favorites.",
        FavoritesError::InvalidCoordinates { .. } => {
            "Coordinates are out of range. Check latitude and longitude."
        }
        FavoritesError::InvalidInput(_) => "Invalid request. Check the parameters.",
        FavoritesError::Storage(_) => "Unable to access saved favorites. Please try again.",
        FavoritesError::Weather(e) => e.user_message(),
    }
}

fn favorites_status_code(error: &FavoritesError) -> u16 {
    match error {
        FavoritesError::Duplicate { .. } => 409,
        FavoritesError::NotFound { .. } => 404,
        FavoritesError::InvalidCoordinates { .. } | FavoritesError::InvalidInput(_) => 400,
        FavoritesError::Storage(_) => 500,
        FavoritesError::Weather(e) => match e {
            WeatherError::NotFound(_) => 404,
            WeatherError::InvalidCriterion(_) | WeatherError::InvalidInput(_) => 400,
            WeatherError::IncompleteData(_) | WeatherError::Upstream { .. } => 502,
        },
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Configuration file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Could not locate a configuration directory.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::Io(_) => "Unable to read or write the configuration file.",
        }
    }
}
