use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Fallback coordinate used when neither settings nor a detected position exist.
pub const DEFAULT_LATITUDE: f64 = 32.715736;
pub const DEFAULT_LONGITUDE: f64 = -117.161087;
pub const DEFAULT_LOCATION_NAME: &str = "San Diego, CA";

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
        if self.errors.is_empty() {
            return String::new();
        }
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

    /// Weather and geocoding endpoints
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Location detection and fallback coordinate
    #[serde(default)]
    pub location: LocationConfig,

    /// File holding the user's dashboard settings (relative to `config_dir`)
    #[serde(default = "default_settings_file")]
    pub settings_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Open-Meteo base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Reverse geocoding base URL
    #[serde(default = "default_geocode_base_url")]
    pub geocode_base_url: String,

    /// Length of the history window in days
    #[serde(default = "default_history_days")]
    pub history_days: u32,

    /// Timeout for weather requests in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Timeout for reverse geocoding in seconds
    #[serde(default = "default_geocode_timeout_secs")]
    pub geocode_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://api.open-meteo.com".to_string()
}

fn default_geocode_base_url() -> String {
    "https://api.bigdatacloud.net".to_string()
}

fn default_history_days() -> u32 {
    30
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_geocode_timeout_secs() -> u64 {
    10
}

fn default_settings_file() -> String {
    "settings.toml".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            geocode_base_url: default_geocode_base_url(),
            history_days: default_history_days(),
            request_timeout_secs: default_request_timeout_secs(),
            geocode_timeout_secs: default_geocode_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    pub default_latitude: f64,
    pub default_longitude: f64,
    pub default_name: String,

    /// Request a high accuracy fix from the sensor
    #[serde(default = "default_high_accuracy")]
    pub high_accuracy: bool,

    /// Sensor timeout in seconds
    #[serde(default = "default_sensor_timeout_secs")]
    pub sensor_timeout_secs: u64,

    /// Accept a cached fix up to this age, in seconds
    #[serde(default = "default_maximum_age_secs")]
    pub maximum_age_secs: u64,

    /// Position reported by the fixed sensor on hosts without GPS
    #[serde(default)]
    pub fixed_position: Option<FixedPosition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedPosition {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub accuracy_meters: Option<f64>,
}

fn default_high_accuracy() -> bool {
    true
}

fn default_sensor_timeout_secs() -> u64 {
    15
}

fn default_maximum_age_secs() -> u64 {
    10
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            default_latitude: DEFAULT_LATITUDE,
            default_longitude: DEFAULT_LONGITUDE,
            default_name: DEFAULT_LOCATION_NAME.to_string(),
            high_accuracy: default_high_accuracy(),
            sensor_timeout_secs: default_sensor_timeout_secs(),
            maximum_age_secs: default_maximum_age_secs(),
            fixed_position: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rainquant");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            location: LocationConfig::default(),
            settings_file: default_settings_file(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, writing defaults when absent
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.api_base_url, "weather.api_base_url", &mut result);
        self.validate_url(
            &self.weather.geocode_base_url,
            "weather.geocode_base_url",
            &mut result,
        );

        if self.weather.history_days == 0 {
            result.add_error("weather.history_days", "History window must be at least 1 day");
        } else if self.weather.history_days > 92 {
            result.add_warning(
                "weather.history_days",
                "History window is longer than the provider usually serves (92 days)",
            );
        }

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if self.location.sensor_timeout_secs == 0 {
            result.add_error(
                "location.sensor_timeout_secs",
                "Sensor timeout must be greater than 0",
            );
        }

        if !(-90.0..=90.0).contains(&self.location.default_latitude) {
            result.add_error("location.default_latitude", "Latitude must be within -90..90");
        }
        if !(-180.0..=180.0).contains(&self.location.default_longitude) {
            result.add_error(
                "location.default_longitude",
                "Longitude must be within -180..180",
            );
        }

        if self.settings_file.trim().is_empty() {
            result.add_error("settings_file", "Settings file name cannot be empty");
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
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Full path of the settings file
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(&self.settings_file)
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("rainquant");

        Ok(config_dir.join("config.toml"))
    }
}
