//! Dashboard view state.
//!
//! `DashboardState` is an immutable value. Every user action is described by
//! an [`Action`] and folded in with [`DashboardState::apply`]; the controller
//! is the only caller. Each action kind has an in-flight flag that blocks a
//! second start until the matching success or failure action arrives.

use chrono::{DateTime, Utc};
use rainquant_core::{AppError, LocationError, DEFAULT_LATITUDE, DEFAULT_LOCATION_NAME, DEFAULT_LONGITUDE};
use rainquant_weather::{Location, Series};

use crate::settings::Settings;

pub const FETCH_FAILED_TEXT: &str = "Failed to fetch weather data. Please try again.";
pub const NO_DATA_TEXT: &str = "Please fetch weather data first";
pub const ANALYSIS_DONE_TEXT: &str = "AI analysis completed successfully";
pub const ANALYSIS_FAILED_TEXT: &str = "Failed to run AI analysis. Please try again.";
pub const LOCATION_FAILED_TEXT: &str =
    "Couldn't detect location automatically. Using default coordinates or configure manually in Settings.";
pub const SAVE_DONE_TEXT: &str = "Settings saved successfully";
pub const SAVE_FAILED_TEXT: &str = "Failed to save settings";

/// User actions guarded by an in-flight flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Fetch,
    Analyze,
    DetectLocation,
    Save,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InFlight {
    pub fetch: bool,
    pub analyze: bool,
    pub detect_location: bool,
    pub save: bool,
}

impl InFlight {
    pub fn is_busy(self, kind: ActionKind) -> bool {
        match kind {
            ActionKind::Fetch => self.fetch,
            ActionKind::Analyze => self.analyze,
            ActionKind::DetectLocation => self.detect_location,
            ActionKind::Save => self.save,
        }
    }

    /// True if a new action of this kind can be started.
    /// Fetching also waits for a running location detection.
    pub fn can_start(self, kind: ActionKind) -> bool {
        match kind {
            ActionKind::Fetch => !self.fetch && !self.detect_location,
            other => !self.is_busy(other),
        }
    }

    fn with(mut self, kind: ActionKind, busy: bool) -> Self {
        match kind {
            ActionKind::Fetch => self.fetch = busy,
            ActionKind::Analyze => self.analyze = busy,
            ActionKind::DetectLocation => self.detect_location = busy,
            ActionKind::Save => self.save = busy,
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
    Info,
}

impl AlertKind {
    pub fn color(self) -> &'static str {
        match self {
            AlertKind::Success => "#10b981",
            AlertKind::Error => "#ef4444",
            AlertKind::Info => "#3b82f6",
        }
    }
}

/// Banner shown at the top of the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub text: String,
}

impl Alert {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Error,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Info,
            text: text.into(),
        }
    }
}

/// Coordinates the next fetch will use
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    /// Shown as the "Auto-detected" badge
    pub auto_detected: bool,
}

impl ActiveLocation {
    pub fn to_location(&self) -> Location {
        Location::new(self.latitude, self.longitude).with_name(self.name.clone())
    }
}

#[derive(Debug)]
pub enum Action {
    SettingsLoaded(Option<Settings>),
    LocationStarted,
    LocationDetected(Location),
    LocationFailed(LocationError),
    FetchStarted,
    FetchSucceeded {
        series: Series,
        location_name: String,
        fetched_at: DateTime<Utc>,
    },
    FetchFailed(AppError),
    /// Analysis requested with no data to analyse
    AnalysisRejected,
    AnalysisStarted,
    AnalysisSucceeded(Series),
    AnalysisFailed(AppError),
    SaveStarted,
    SaveSucceeded(Settings),
    SaveFailed(AppError),
    DismissAlert,
}

impl Action {
    /// The in-flight flag this action starts, if any
    pub fn starts(&self) -> Option<ActionKind> {
        match self {
            Action::LocationStarted => Some(ActionKind::DetectLocation),
            Action::FetchStarted => Some(ActionKind::Fetch),
            Action::AnalysisStarted => Some(ActionKind::Analyze),
            Action::SaveStarted => Some(ActionKind::Save),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub settings: Option<Settings>,
    pub series: Series,
    pub detected_location: Option<Location>,
    pub alert: Option<Alert>,
    pub in_flight: InFlight,
    pub last_fetch: Option<DateTime<Utc>>,
    /// Coordinate used when nothing else is known
    pub fallback: Location,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(
            Location::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE).with_name(DEFAULT_LOCATION_NAME),
        )
    }
}

impl DashboardState {
    pub fn new(fallback: Location) -> Self {
        Self {
            settings: None,
            series: Series::default(),
            detected_location: None,
            alert: None,
            in_flight: InFlight::default(),
            last_fetch: None,
            fallback,
        }
    }

    pub fn can_start(&self, kind: ActionKind) -> bool {
        self.in_flight.can_start(kind)
    }

    /// Detection runs at load when nothing is stored or auto mode is on.
    pub fn should_auto_detect(&self) -> bool {
        self.settings
            .as_ref()
            .map_or(true, Settings::auto_location_enabled)
    }

    /// Manual coordinates win, then a detected fix, then stored or default
    /// coordinates.
    pub fn active_location(&self) -> ActiveLocation {
        let settings = self.settings.as_ref();
        let auto_detected = settings.map_or(true, Settings::auto_location_enabled);

        if let Some((latitude, longitude)) = settings.and_then(Settings::manual_coordinates) {
            return ActiveLocation {
                latitude,
                longitude,
                name: settings
                    .and_then(|s| s.location_name.clone())
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| "Unknown".to_string()),
                auto_detected,
            };
        }

        if let Some(detected) = &self.detected_location {
            return ActiveLocation {
                latitude: detected.latitude,
                longitude: detected.longitude,
                name: detected
                    .name
                    .clone()
                    .unwrap_or_else(|| detected.coordinate_label(4)),
                auto_detected,
            };
        }

        let fallback_name = self
            .fallback
            .name
            .clone()
            .unwrap_or_else(|| self.fallback.coordinate_label(4));

        ActiveLocation {
            latitude: settings
                .and_then(|s| s.latitude)
                .unwrap_or(self.fallback.latitude),
            longitude: settings
                .and_then(|s| s.longitude)
                .unwrap_or(self.fallback.longitude),
            name: settings
                .and_then(|s| s.location_name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or(fallback_name),
            auto_detected,
        }
    }

    /// Fold one action into the state.
    pub fn apply(self, action: Action) -> Self {
        if let Some(kind) = action.starts() {
            return Self {
                in_flight: self.in_flight.with(kind, true),
                alert: None,
                ..self
            };
        }

        match action {
            Action::SettingsLoaded(settings) => Self {
                last_fetch: settings.as_ref().and_then(|s| s.last_fetch).or(self.last_fetch),
                settings,
                ..self
            },
            Action::LocationDetected(location) => Self {
                detected_location: Some(location),
                in_flight: self.in_flight.with(ActionKind::DetectLocation, false),
                ..self
            },
            Action::LocationFailed(_) => Self {
                alert: Some(Alert::info(LOCATION_FAILED_TEXT)),
                in_flight: self.in_flight.with(ActionKind::DetectLocation, false),
                ..self
            },
            Action::FetchSucceeded {
                series,
                location_name,
                fetched_at,
            } => Self {
                series,
                last_fetch: Some(fetched_at),
                alert: Some(Alert::success(format!(
                    "Weather data updated for {}",
                    location_name
                ))),
                in_flight: self.in_flight.with(ActionKind::Fetch, false),
                ..self
            },
            Action::FetchFailed(_) => Self {
                alert: Some(Alert::error(FETCH_FAILED_TEXT)),
                in_flight: self.in_flight.with(ActionKind::Fetch, false),
                ..self
            },
            Action::AnalysisRejected => Self {
                alert: Some(Alert::error(NO_DATA_TEXT)),
                ..self
            },
            Action::AnalysisSucceeded(series) => Self {
                series,
                alert: Some(Alert::success(ANALYSIS_DONE_TEXT)),
                in_flight: self.in_flight.with(ActionKind::Analyze, false),
                ..self
            },
            Action::AnalysisFailed(_) => Self {
                alert: Some(Alert::error(ANALYSIS_FAILED_TEXT)),
                in_flight: self.in_flight.with(ActionKind::Analyze, false),
                ..self
            },
            Action::SaveSucceeded(settings) => Self {
                settings: Some(settings),
                alert: Some(Alert::success(SAVE_DONE_TEXT)),
                in_flight: self.in_flight.with(ActionKind::Save, false),
                ..self
            },
            Action::SaveFailed(err) => {
                let text = match &err {
                    AppError::Validation(v) => format!("Invalid {}", v),
                    _ => SAVE_FAILED_TEXT.to_string(),
                };
                Self {
                    alert: Some(Alert::error(text)),
                    in_flight: self.in_flight.with(ActionKind::Save, false),
                    ..self
                }
            }
            Action::DismissAlert => Self {
                alert: None,
                ..self
            },
            Action::LocationStarted
            | Action::FetchStarted
            | Action::AnalysisStarted
            | Action::SaveStarted => self,
        }
    }
}
