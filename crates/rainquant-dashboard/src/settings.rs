//! Dashboard settings: the persisted record, the editable form, and the
//! persistence seam.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rainquant_core::{
    AppError, ValidationError, DEFAULT_LATITUDE, DEFAULT_LOCATION_NAME, DEFAULT_LONGITUDE,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persisted user settings. Every field is optional; absent fields take the
/// form defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_alerts: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_auto_location: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_fetch: Option<DateTime<Utc>>,
}

impl Settings {
    /// Auto detection is on unless explicitly disabled.
    pub fn auto_location_enabled(&self) -> bool {
        self.use_auto_location != Some(false)
    }

    /// Manual coordinates, when auto detection is off and both are stored.
    pub fn manual_coordinates(&self) -> Option<(f64, f64)> {
        match (self.use_auto_location, self.latitude, self.longitude) {
            (Some(false), Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Controlled form state behind the settings screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsForm {
    pub latitude: String,
    pub longitude: String,
    pub location_name: String,
    pub alert_email: String,
    pub enable_alerts: bool,
    pub use_auto_location: bool,
}

impl Default for SettingsForm {
    fn default() -> Self {
        Self::from_settings(None)
    }
}

impl SettingsForm {
    /// Initialize the form from a possibly absent settings snapshot.
    pub fn from_settings(settings: Option<&Settings>) -> Self {
        let latitude = settings.and_then(|s| s.latitude).unwrap_or(DEFAULT_LATITUDE);
        let longitude = settings.and_then(|s| s.longitude).unwrap_or(DEFAULT_LONGITUDE);

        Self {
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
            location_name: settings
                .and_then(|s| s.location_name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| DEFAULT_LOCATION_NAME.to_string()),
            alert_email: settings
                .and_then(|s| s.alert_email.clone())
                .unwrap_or_default(),
            enable_alerts: settings.and_then(|s| s.enable_alerts).unwrap_or(true),
            use_auto_location: settings.and_then(|s| s.use_auto_location).unwrap_or(true),
        }
    }

    /// Parse the form into a settings record. Coordinates must be finite
    /// numbers; nothing else is validated.
    pub fn submit(&self) -> Result<Settings, ValidationError> {
        let latitude = parse_coordinate("latitude", &self.latitude)?;
        let longitude = parse_coordinate("longitude", &self.longitude)?;
        let alert_email = self.alert_email.trim();

        Ok(Settings {
            latitude: Some(latitude),
            longitude: Some(longitude),
            location_name: Some(self.location_name.trim().to_string()),
            alert_email: (!alert_email.is_empty()).then(|| alert_email.to_string()),
            enable_alerts: Some(self.enable_alerts),
            use_auto_location: Some(self.use_auto_location),
            last_fetch: None,
        })
    }
}

fn parse_coordinate(field: &str, text: &str) -> Result<f64, ValidationError> {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::new(
            field,
            format!("{:?} is not a number", text.trim()),
        )),
    }
}

/// Settings persistence.
pub trait SettingsStore {
    fn get_settings(&self) -> Result<Option<Settings>, AppError>;

    fn save_settings(&self, settings: &Settings) -> Result<(), AppError>;
}

/// TOML file in the configuration directory.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettingsStore {
    fn get_settings(&self) -> Result<Option<Settings>, AppError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let settings = toml::from_str(&contents)
            .map_err(|e| AppError::storage(format!("Failed to parse settings: {}", e)))?;
        Ok(Some(settings))
    }

    fn save_settings(&self, settings: &Settings) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(settings)
            .map_err(|e| AppError::storage(format!("Failed to serialize settings: {}", e)))?;
        std::fs::write(&self.path, contents)?;

        tracing::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

/// In-memory store, also used when no settings file is configured.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: Mutex<Option<Settings>>,
    saves: Mutex<usize>,
}

impl MemorySettingsStore {
    pub fn new(initial: Option<Settings>) -> Self {
        Self {
            settings: Mutex::new(initial),
            saves: Mutex::new(0),
        }
    }

    /// Number of successful `save_settings` calls
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_settings(&self) -> Result<Option<Settings>, AppError> {
        Ok(self.settings.lock().clone())
    }

    fn save_settings(&self, settings: &Settings) -> Result<(), AppError> {
        *self.settings.lock() = Some(settings.clone());
        *self.saves.lock() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_defaults_without_settings() {
        let form = SettingsForm::from_settings(None);
        assert_eq!(form.latitude, "32.715736");
        assert_eq!(form.longitude, "-117.161087");
        assert_eq!(form.location_name, "San Diego, CA");
        assert_eq!(form.alert_email, "");
        assert!(form.enable_alerts);
        assert!(form.use_auto_location);
    }

    #[test]
    fn test_form_from_settings_keeps_zero_coordinates() {
        let settings = Settings {
            latitude: Some(0.0),
            longitude: Some(0.0),
            location_name: Some("Null Island".into()),
            enable_alerts: Some(false),
            use_auto_location: Some(false),
            ..Settings::default()
        };
        let form = SettingsForm::from_settings(Some(&settings));
        assert_eq!(form.latitude, "0");
        assert_eq!(form.longitude, "0");
        assert_eq!(form.location_name, "Null Island");
        assert!(!form.enable_alerts);
        assert!(!form.use_auto_location);
    }

    #[test]
    fn test_submit_parses_coordinates() {
        let form = SettingsForm {
            latitude: " 47.6062 ".into(),
            longitude: "-122.3321".into(),
            location_name: "Seattle, WA".into(),
            alert_email: "ops@example.com".into(),
            enable_alerts: true,
            use_auto_location: false,
        };
        let settings = form.submit().unwrap();
        assert_eq!(settings.latitude, Some(47.6062));
        assert_eq!(settings.longitude, Some(-122.3321));
        assert_eq!(settings.alert_email.as_deref(), Some("ops@example.com"));
        assert_eq!(settings.manual_coordinates(), Some((47.6062, -122.3321)));
    }

    #[test]
    fn test_submit_rejects_non_numeric_latitude() {
        let form = SettingsForm {
            latitude: "abc".into(),
            ..SettingsForm::default()
        };
        let err = form.submit().unwrap_err();
        assert_eq!(err.field, "latitude");
    }

    #[test]
    fn test_submit_rejects_nan_and_empty() {
        let nan = SettingsForm {
            longitude: "NaN".into(),
            ..SettingsForm::default()
        };
        assert_eq!(nan.submit().unwrap_err().field, "longitude");

        let empty = SettingsForm {
            latitude: "".into(),
            ..SettingsForm::default()
        };
        assert_eq!(empty.submit().unwrap_err().field, "latitude");
    }

    #[test]
    fn test_empty_email_is_absent() {
        let settings = SettingsForm::default().submit().unwrap();
        assert_eq!(settings.alert_email, None);
    }

    #[test]
    fn test_auto_location_flags() {
        assert!(Settings::default().auto_location_enabled());
        let manual_without_coords = Settings {
            use_auto_location: Some(false),
            ..Settings::default()
        };
        assert!(!manual_without_coords.auto_location_enabled());
        assert_eq!(manual_without_coords.manual_coordinates(), None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("nested").join("settings.toml"));
        assert_eq!(store.get_settings().unwrap(), None);

        let settings = SettingsForm::default().submit().unwrap();
        store.save_settings(&settings).unwrap();
        assert_eq!(store.get_settings().unwrap(), Some(settings));
    }

    #[test]
    fn test_file_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "latitude = \"north\"").unwrap();
        let err = FileSettingsStore::new(path).get_settings().unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }

    #[test]
    fn test_memory_store_counts_saves() {
        let store = MemorySettingsStore::default();
        store.save_settings(&Settings::default()).unwrap();
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.get_settings().unwrap(), Some(Settings::default()));
    }
}
