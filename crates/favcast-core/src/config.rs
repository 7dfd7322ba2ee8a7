use favcast_weather::{Units, DATA_API_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_ZOOM, GEO_API_URL, MAX_ZOOM, TILE_API_URL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

type Result<T> = std::result::Result<T, ConfigError>;

/// Environment variable that overrides `weather.api_key`
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key. `OPENWEATHER_API_KEY` takes precedence.
    pub api_key: String,

    pub geo_api_url: String,
    pub data_api_url: String,
    pub tile_api_url: String,

    /// Per-request timeout for upstream calls
    pub timeout_secs: u64,

    /// Zoom used for map tiles when none is given
    pub map_zoom: u8,

    pub units: Units,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            geo_api_url: GEO_API_URL.to_string(),
            data_api_url: DATA_API_URL.to_string(),
            tile_api_url: TILE_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            map_zoom: DEFAULT_ZOOM,
            units: Units::default(),
        }
    }
}

/// Where favorites are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    Sqlite,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// SQLite database file; defaults to `favorites.db` in the config directory
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when RUST_LOG is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("favcast")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            weather: WeatherConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// A loaded, validated configuration plus what happened while loading it.
///
/// Loading runs before tracing is set up (the log level comes from the
/// config), so notices are held here until `log_notices` is called.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub validation: ValidationResult,

    /// Set when no file existed and defaults were written to this path
    pub created_at: Option<PathBuf>,
}

impl LoadedConfig {
    pub fn log_notices(&self) {
        if let Some(path) = &self.created_at {
            tracing::info!("Created default config at {}", path.display());
        }
        for warning in &self.validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }
    }
}

impl Config {
    /// Load and validate the configuration from the default location,
    /// creating it if it doesn't exist.
    pub fn load_validated() -> Result<LoadedConfig> {
        Self::load_validated_from(&Self::config_path()?, std::env::var(API_KEY_ENV).ok())
    }

    /// Load `path` (writing defaults there if missing), apply the API key
    /// override and validate.
    ///
    /// Fails with `ConfigError::Invalid` when validation reports errors.
    pub fn load_validated_from(path: &Path, api_key: Option<String>) -> Result<LoadedConfig> {
        let (mut config, created) = Self::read_or_create(path)?;
        config.apply_api_key_override(api_key);

        let validation = config.validate();
        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        Ok(LoadedConfig {
            config,
            validation,
            created_at: created.then(|| path.to_path_buf()),
        })
    }

    fn read_or_create(path: &Path) -> Result<(Self, bool)> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok((config, true));
        }

        let contents = std::fs::read_to_string(path)?;
        let config =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        Ok((config, false))
    }

    fn apply_api_key_override(&mut self, api_key: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.weather.api_key = key;
        }
    }

    /// Resolved SQLite database path
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| self.config_dir.join("favorites.db"))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.geo_api_url, "weather.geo_api_url", &mut result);
        self.validate_url(&self.weather.data_api_url, "weather.data_api_url", &mut result);
        self.validate_url(&self.weather.tile_api_url, "weather.tile_api_url", &mut result);

        if self.weather.api_key.trim().is_empty() {
            result.add_warning(
                "weather.api_key",
                format!(
                    "No API key configured (set it here or via {}); upstream calls will be rejected",
                    API_KEY_ENV
                ),
            );
        }

        if self.weather.timeout_secs == 0 {
            result.add_error("weather.timeout_secs", "Timeout must be greater than 0");
        } else if self.weather.timeout_secs > 60 {
            result.add_warning(
                "weather.timeout_secs",
                "Timeout is unusually long (>60 seconds)",
            );
        }

        if self.weather.map_zoom > MAX_ZOOM {
            result.add_error(
                "weather.map_zoom",
                format!("Zoom must be at most {}", MAX_ZOOM),
            );
        }

        if tracing_subscriber::EnvFilter::try_new(&self.logging.level).is_err() {
            result.add_error(
                "logging.level",
                format!("Invalid log filter: {}", self.logging.level),
            );
        }

        if self.storage.backend == StorageBackend::Sqlite {
            let db_path = self.database_path();
            if db_path.is_dir() {
                result.add_error(
                    "storage.database_path",
                    format!("Path is a directory: {}", db_path.display()),
                );
            }
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Invalid(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound("no user config directory".to_string()))?
            .join("favcast");

        Ok(config_dir.join("config.toml"))
    }
}
