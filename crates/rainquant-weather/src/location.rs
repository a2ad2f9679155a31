//! Device position: a one-shot sensor request with accuracy, timeout and
//! cached-fix options.

use parking_lot::Mutex;
use rainquant_core::{LocationConfig, LocationError};
use std::time::Duration;
use tokio::time::Instant;

use crate::types::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the sensor may return instead of a fresh one
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(15),
            maximum_age: Duration::from_secs(10),
        }
    }
}

impl PositionOptions {
    pub fn from_config(config: &LocationConfig) -> Self {
        Self {
            high_accuracy: config.high_accuracy,
            timeout: Duration::from_secs(config.sensor_timeout_secs),
            maximum_age: Duration::from_secs(config.maximum_age_secs),
        }
    }
}

/// Source of the device position.
#[allow(async_fn_in_trait)]
pub trait LocationSensor {
    async fn current_position(&self, options: &PositionOptions) -> Result<Location, LocationError>;
}

/// Request one fix, giving up after `options.timeout`.
pub async fn locate<S: LocationSensor>(
    sensor: &S,
    options: &PositionOptions,
) -> Result<Location, LocationError> {
    match tokio::time::timeout(options.timeout, sensor.current_position(options)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Location request timed out after {:?}", options.timeout);
            Err(LocationError::Timeout)
        }
    }
}

/// Sensor for hosts without positioning hardware: always reports the
/// configured coordinate.
#[derive(Debug, Clone)]
pub struct FixedLocationSensor {
    location: Location,
}

impl FixedLocationSensor {
    pub fn new(location: Location) -> Self {
        Self { location }
    }
}

impl LocationSensor for FixedLocationSensor {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Location, LocationError> {
        Ok(self.location.clone())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableLocationSensor;

impl LocationSensor for UnavailableLocationSensor {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Location, LocationError> {
        Err(LocationError::ServiceUnavailable)
    }
}

/// Wraps a sensor and answers from the last fix while it is younger than
/// `options.maximum_age`. Failures are not cached.
#[derive(Debug)]
pub struct CachedLocationSensor<S> {
    inner: S,
    last_fix: Mutex<Option<(Instant, Location)>>,
}

impl<S> CachedLocationSensor<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            last_fix: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: LocationSensor> LocationSensor for CachedLocationSensor<S> {
    async fn current_position(&self, options: &PositionOptions) -> Result<Location, LocationError> {
        if let Some((taken_at, location)) = self.last_fix.lock().as_ref() {
            if taken_at.elapsed() <= options.maximum_age {
                tracing::debug!("Using cached fix from {:?} ago", taken_at.elapsed());
                return Ok(location.clone());
            }
        }

        let location = self.inner.current_position(options).await?;
        *self.last_fix.lock() = Some((Instant::now(), location.clone()));
        Ok(location)
    }
}

/// Either of the shipped sensors, picked from configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredSensor {
    Fixed(FixedLocationSensor),
    Unavailable(UnavailableLocationSensor),
}

impl ConfiguredSensor {
    pub fn from_config(config: &LocationConfig) -> Self {
        match config.fixed_position {
            Some(pos) => Self::Fixed(FixedLocationSensor::new(Location {
                latitude: pos.latitude,
                longitude: pos.longitude,
                accuracy_meters: pos.accuracy_meters,
                name: None,
            })),
            None => Self::Unavailable(UnavailableLocationSensor),
        }
    }
}

impl LocationSensor for ConfiguredSensor {
    async fn current_position(&self, options: &PositionOptions) -> Result<Location, LocationError> {
        match self {
            Self::Fixed(s) => s.current_position(options).await,
            Self::Unavailable(s) => s.current_position(options).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rainquant_core::FixedPosition;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StalledSensor;

    #[derive(Default)]
    struct CountingSensor {
        calls: AtomicUsize,
    }

    impl LocationSensor for CountingSensor {
        async fn current_position(&self, _options: &PositionOptions) -> Result<Location, LocationError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Location::new(n as f64, 0.0))
        }
    }

    impl LocationSensor for StalledSensor {
        async fn current_position(&self, _options: &PositionOptions) -> Result<Location, LocationError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Location::new(0.0, 0.0))
        }
    }

    #[test]
    fn test_default_options() {
        let options = PositionOptions::default();
        assert!(options.high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(15));
        assert_eq!(options.maximum_age, Duration::from_secs(10));
        assert_eq!(PositionOptions::from_config(&LocationConfig::default()), options);
    }

    #[tokio::test]
    async fn test_fixed_sensor_reports_location() {
        let sensor = FixedLocationSensor::new(Location::new(47.6, -122.3));
        let loc = locate(&sensor, &PositionOptions::default()).await.unwrap();
        assert_eq!(loc.latitude, 47.6);
    }

    #[tokio::test]
    async fn test_unavailable_sensor() {
        let err = locate(&UnavailableLocationSensor, &PositionOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, LocationError::ServiceUnavailable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_sensor_times_out() {
        let err = locate(&StalledSensor, &PositionOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, LocationError::Timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cached_fix_within_maximum_age() {
        let sensor = CachedLocationSensor::new(CountingSensor::default());
        let options = PositionOptions::default();

        let first = locate(&sensor, &options).await.unwrap();
        tokio::time::advance(Duration::from_secs(5)).await;
        let second = locate(&sensor, &options).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(sensor.inner().calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(6)).await;
        let third = locate(&sensor, &options).await.unwrap();
        assert_eq!(third.latitude, 2.0);
        assert_eq!(sensor.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_maximum_age_always_asks_sensor() {
        let sensor = CachedLocationSensor::new(CountingSensor::default());
        let options = PositionOptions {
            maximum_age: Duration::ZERO,
            ..PositionOptions::default()
        };

        locate(&sensor, &options).await.unwrap();
        tokio::time::advance(Duration::from_millis(1)).await;
        locate(&sensor, &options).await.unwrap();
        assert_eq!(sensor.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let sensor = CachedLocationSensor::new(UnavailableLocationSensor);
        for _ in 0..2 {
            let err = locate(&sensor, &PositionOptions::default()).await.unwrap_err();
            assert_eq!(err, LocationError::ServiceUnavailable);
        }
    }

    #[tokio::test]
    async fn test_configured_sensor_selection() {
        let mut config = LocationConfig::default();
        assert!(matches!(
            ConfiguredSensor::from_config(&config),
            ConfiguredSensor::Unavailable(_)
        ));

        config.fixed_position = Some(FixedPosition {
            latitude: 10.0,
            longitude: 20.0,
            accuracy_meters: Some(5.0),
        });
        let sensor = ConfiguredSensor::from_config(&config);
        let loc = locate(&sensor, &PositionOptions::default()).await.unwrap();
        assert_eq!((loc.latitude, loc.longitude), (10.0, 20.0));
        assert_eq!(loc.accuracy_meters, Some(5.0));
    }
}
