//! Weather data for RainQuant
//!
//! Fetches daily precipitation history from Open-Meteo, normalizes it into a
//! typed series and derives the figures the dashboard shows.

pub mod geocode;
pub mod location;
pub mod normalize;
pub mod provider;
pub mod risk;
pub mod stats;
pub mod types;

pub use geocode::ReverseGeocoder;
pub use location::{
    locate, CachedLocationSensor, ConfiguredSensor, LocationSensor, PositionOptions,
};
pub use normalize::{normalize, normalize_json, ForecastResponse};
pub use provider::WeatherProvider;
pub use risk::{BadgeColors, RiskDisplay};
pub use stats::SeriesStats;
pub use types::*;
