pub mod app;
pub mod config;
pub mod error;

pub use app::App;
pub use config::{
    Config, LoadedConfig, LoggingConfig, StorageBackend, StorageConfig, ValidationResult,
    WeatherConfig, API_KEY_ENV,
};
pub use error::{AppError, ConfigError};

use anyhow::Result;

/// Initialize tracing. `RUST_LOG` wins over `default_level`.
pub fn init(default_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!("Favcast core initialized");
    Ok(())
}
