//! Async action controller.
//!
//! Owns the view state and the collaborators. Each action checks its
//! in-flight flag, marks it, awaits the collaborator and folds the result
//! back in. Failures become a banner; nothing is returned as an error and
//! nothing is retried.

use chrono::{Local, NaiveDate, Utc};
use rainquant_core::{AppError, Config};
use rainquant_weather::{
    locate, Location, LocationSensor, PositionOptions, ReverseGeocoder, WeatherProvider,
};
use std::time::Duration;

use crate::analysis::AnalysisBackend;
use crate::settings::{SettingsForm, SettingsStore};
use crate::state::{Action, ActionKind, DashboardState};

/// How an action ended. The banner in the state carries the details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Done,
    Failed,
    /// The same action was already in flight; nothing was done.
    Busy,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

pub struct Dashboard<L, A, S> {
    state: DashboardState,
    provider: WeatherProvider,
    geocoder: ReverseGeocoder,
    sensor: L,
    analysis: A,
    store: S,
    position_options: PositionOptions,
    clock: fn() -> NaiveDate,
}

impl<L, A, S> Dashboard<L, A, S>
where
    L: LocationSensor,
    A: AnalysisBackend,
    S: SettingsStore,
{
    pub fn new(
        provider: WeatherProvider,
        geocoder: ReverseGeocoder,
        sensor: L,
        analysis: A,
        store: S,
    ) -> Self {
        Self {
            state: DashboardState::default(),
            provider,
            geocoder,
            sensor,
            analysis,
            store,
            position_options: PositionOptions::default(),
            clock: local_today,
        }
    }

    /// Build the provider, geocoder and fallback location from configuration.
    pub fn from_config(config: &Config, sensor: L, analysis: A, store: S) -> Result<Self, AppError> {
        let provider = WeatherProvider::from_config(&config.weather)?;
        let geocoder = ReverseGeocoder::new(
            &config.weather.geocode_base_url,
            Duration::from_secs(config.weather.geocode_timeout_secs),
        );
        let fallback = Location::new(
            config.location.default_latitude,
            config.location.default_longitude,
        )
        .with_name(config.location.default_name.clone());

        let mut dashboard = Self::new(provider, geocoder, sensor, analysis, store)
            .with_position_options(PositionOptions::from_config(&config.location));
        dashboard.state = DashboardState::new(fallback);
        Ok(dashboard)
    }

    pub fn with_position_options(mut self, options: PositionOptions) -> Self {
        self.position_options = options;
        self
    }

    /// Replace the source of "today" used for the fetch window and stats.
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = state.apply(action);
    }

    /// Read settings once, then detect the position when auto mode applies.
    pub async fn load(&mut self) -> ActionOutcome {
        let settings = match self.store.get_settings() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Failed to load settings, using defaults: {}", e);
                None
            }
        };
        self.dispatch(Action::SettingsLoaded(settings));

        if self.state.should_auto_detect() {
            return self.detect_location().await;
        }
        ActionOutcome::Done
    }

    pub async fn detect_location(&mut self) -> ActionOutcome {
        if !self.state.can_start(ActionKind::DetectLocation) {
            return ActionOutcome::Busy;
        }
        self.dispatch(Action::LocationStarted);

        match locate(&self.sensor, &self.position_options).await {
            Ok(mut location) => {
                let name = self.geocoder.place_name(&location).await;
                tracing::info!(
                    "Detected location {}, {} ({})",
                    location.latitude,
                    location.longitude,
                    name
                );
                location.name = Some(name);
                self.dispatch(Action::LocationDetected(location));
                ActionOutcome::Done
            }
            Err(e) => {
                tracing::error!("Location detection error: {}", e);
                self.dispatch(Action::LocationFailed(e));
                ActionOutcome::Failed
            }
        }
    }

    pub async fn fetch_weather(&mut self) -> ActionOutcome {
        if !self.state.can_start(ActionKind::Fetch) {
            return ActionOutcome::Busy;
        }
        let active = self.state.active_location();
        self.dispatch(Action::FetchStarted);

        match self
            .provider
            .fetch_history(&active.to_location(), self.today())
            .await
        {
            Ok(series) => {
                tracing::info!("Weather data updated for {}", active.name);
                self.dispatch(Action::FetchSucceeded {
                    series,
                    location_name: active.name,
                    fetched_at: Utc::now(),
                });
                ActionOutcome::Done
            }
            Err(e) => {
                let err = AppError::from(e);
                tracing::error!("Error fetching weather data: {}", err);
                self.dispatch(Action::FetchFailed(err));
                ActionOutcome::Failed
            }
        }
    }

    pub async fn run_analysis(&mut self) -> ActionOutcome {
        if self.state.series.is_empty() {
            self.dispatch(Action::AnalysisRejected);
            return ActionOutcome::Failed;
        }
        if !self.state.can_start(ActionKind::Analyze) {
            return ActionOutcome::Busy;
        }
        self.dispatch(Action::AnalysisStarted);

        match self.analysis.run_analysis(&self.state.series).await {
            Ok(series) => {
                self.dispatch(Action::AnalysisSucceeded(series));
                ActionOutcome::Done
            }
            Err(e) => {
                tracing::error!("Error running AI analysis: {}", e);
                self.dispatch(Action::AnalysisFailed(e));
                ActionOutcome::Failed
            }
        }
    }

    /// Validate the form and hand it to the store. Invalid input never
    /// reaches the store.
    pub fn save_settings(&mut self, form: &SettingsForm) -> ActionOutcome {
        if !self.state.can_start(ActionKind::Save) {
            return ActionOutcome::Busy;
        }
        self.dispatch(Action::SaveStarted);

        let mut settings = match form.submit() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Rejected settings: {}", e);
                self.dispatch(Action::SaveFailed(e.into()));
                return ActionOutcome::Failed;
            }
        };
        settings.last_fetch = self.state.last_fetch;

        match self.store.save_settings(&settings) {
            Ok(()) => {
                tracing::info!("Settings saved");
                self.dispatch(Action::SaveSucceeded(settings));
                ActionOutcome::Done
            }
            Err(e) => {
                tracing::error!("Failed to save settings: {}", e);
                self.dispatch(Action::SaveFailed(e));
                ActionOutcome::Failed
            }
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.dispatch(Action::DismissAlert);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettingsStore;
    use rainquant_core::LocationError;
    use rainquant_weather::{DailyRecord, Series};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSensor {
        calls: AtomicUsize,
    }

    impl LocationSensor for CountingSensor {
        async fn current_position(&self, _options: &PositionOptions) -> Result<Location, LocationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Location::new(1.0, 2.0))
        }
    }

    #[derive(Default)]
    struct CountingAnalysis {
        calls: AtomicUsize,
    }

    impl AnalysisBackend for CountingAnalysis {
        async fn run_analysis(&self, series: &Series) -> Result<Series, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(series.clone())
        }
    }

    // Nothing listens on the discard port; a busy action must not reach it.
    fn dashboard() -> Dashboard<CountingSensor, CountingAnalysis, MemorySettingsStore> {
        let provider =
            WeatherProvider::new("http://127.0.0.1:9", 30, Duration::from_millis(200)).unwrap();
        let geocoder = ReverseGeocoder::new("http://127.0.0.1:9", Duration::from_millis(200));
        Dashboard::new(
            provider,
            geocoder,
            CountingSensor::default(),
            CountingAnalysis::default(),
            MemorySettingsStore::new(None),
        )
    }

    fn series() -> Series {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        Series::new(vec![DailyRecord::new(date, 1.5)])
    }

    #[tokio::test]
    async fn test_busy_fetch_is_skipped() {
        let mut dash = dashboard();
        dash.dispatch(Action::FetchStarted);

        assert_eq!(dash.fetch_weather().await, ActionOutcome::Busy);
        assert!(dash.state().in_flight.fetch);
        assert!(dash.state().series.is_empty());
        assert!(dash.state().alert.is_none());
    }

    #[tokio::test]
    async fn test_fetch_waits_for_location_detection() {
        let mut dash = dashboard();
        dash.dispatch(Action::LocationStarted);

        assert_eq!(dash.fetch_weather().await, ActionOutcome::Busy);
        assert!(!dash.state().in_flight.fetch);
    }

    #[tokio::test]
    async fn test_busy_detection_does_not_query_sensor() {
        let mut dash = dashboard();
        dash.dispatch(Action::LocationStarted);

        assert_eq!(dash.detect_location().await, ActionOutcome::Busy);
        assert_eq!(dash.sensor.calls.load(Ordering::SeqCst), 0);
        assert!(dash.state().detected_location.is_none());
    }

    #[tokio::test]
    async fn test_busy_analysis_does_not_call_backend() {
        let mut dash = dashboard();
        dash.dispatch(Action::FetchSucceeded {
            series: series(),
            location_name: "Test".into(),
            fetched_at: Utc::now(),
        });
        dash.dispatch(Action::AnalysisStarted);

        assert_eq!(dash.run_analysis().await, ActionOutcome::Busy);
        assert_eq!(dash.analysis.calls.load(Ordering::SeqCst), 0);
        assert!(dash.state().in_flight.analyze);
    }

    #[test]
    fn test_busy_save_does_not_touch_store() {
        let mut dash = dashboard();
        dash.dispatch(Action::SaveStarted);

        assert_eq!(dash.save_settings(&SettingsForm::default()), ActionOutcome::Busy);
        assert_eq!(dash.store().save_count(), 0);
        assert!(dash.state().settings.is_none());
    }

    #[tokio::test]
    async fn test_detection_runs_once_idle() {
        let mut dash = dashboard();
        dash.dispatch(Action::LocationStarted);
        assert_eq!(dash.detect_location().await, ActionOutcome::Busy);

        dash.dispatch(Action::LocationFailed(LocationError::Timeout));
        // Geocoding the fix fails against the closed port and falls back to coordinates.
        assert_eq!(dash.detect_location().await, ActionOutcome::Done);
        assert_eq!(dash.sensor.calls.load(Ordering::SeqCst), 1);
    }
}
