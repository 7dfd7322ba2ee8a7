use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use favcast_services::{FavoritesService, FavoritesStore, SqliteFavoritesStore};
use favcast_weather::{build_client, CoordinateResolver, TileMapper, WeatherGateway};

use crate::config::{Config, StorageBackend};

/// Application state: configuration plus the wired favorites service
pub struct App {
    config: Arc<Config>,
    service: FavoritesService,
}

impl App {
    /// Wire the service from an already loaded configuration
    pub fn from_config(config: Config) -> Result<Self> {
        let weather = &config.weather;
        let client = Arc::new(
            build_client(Duration::from_secs(weather.timeout_secs))
                .context("Failed to build HTTP client")?,
        );

        let store = match config.storage.backend {
            StorageBackend::Memory => FavoritesStore::memory(),
            StorageBackend::Sqlite => {
                let path = config.database_path();
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .context("Failed to create database directory")?;
                }
                let store = SqliteFavoritesStore::open(&path)
                    .with_context(|| format!("Failed to open {}", path.display()))?;
                tracing::info!("Using SQLite favorites at {}", path.display());
                FavoritesStore::sqlite(store)
            }
        };

        let service = FavoritesService::new(
            store,
            CoordinateResolver::new(client.clone(), &weather.geo_api_url, &weather.api_key),
            WeatherGateway::new(client, &weather.data_api_url, &weather.api_key, weather.units),
            TileMapper::new(&weather.tile_api_url, &weather.api_key)
                .with_default_zoom(weather.map_zoom),
        );

        tracing::info!("Application initialized successfully");
        Ok(Self {
            config: Arc::new(config),
            service,
        })
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> &FavoritesService {
        &self.service
    }
}
