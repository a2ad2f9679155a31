pub mod config;
pub mod error;

pub use config::{
    Config, FixedPosition, LocationConfig, ValidationResult, WeatherConfig, DEFAULT_LATITUDE,
    DEFAULT_LOCATION_NAME, DEFAULT_LONGITUDE,
};
pub use error::{
    AppError, LocationError, NetworkError, ReqwestErrorExt, ValidationError,
};

use anyhow::Result;

/// Initialize logging for the application
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("RainQuant core initialized");
    Ok(())
}
