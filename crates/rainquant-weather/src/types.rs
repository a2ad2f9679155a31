use chrono::NaiveDate;
use rainquant_core::{AppError, NetworkError};
use serde::{Deserialize, Serialize};

/// Drought risk label attached to a day by an external analysis step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DroughtRisk {
    Low,
    Medium,
    High,
}

impl DroughtRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Parse a risk label, ignoring case. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for DroughtRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One calendar day of observed weather
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub precipitation_mm: f64,
    #[serde(default)]
    pub temperature_max_c: Option<f64>,
    #[serde(default)]
    pub temperature_min_c: Option<f64>,
    #[serde(default)]
    pub drought_risk: Option<DroughtRisk>,
    #[serde(default)]
    pub ai_explanation: Option<String>,
    #[serde(default)]
    pub ai_suggestions: Vec<String>,
}

impl DailyRecord {
    /// A record with only a date and precipitation
    pub fn new(date: NaiveDate, precipitation_mm: f64) -> Self {
        Self {
            date,
            precipitation_mm,
            temperature_max_c: None,
            temperature_min_c: None,
            drought_risk: None,
            ai_explanation: None,
            ai_suggestions: Vec::new(),
        }
    }
}

/// Daily records for one location, oldest first as the provider returns them.
///
/// Dates are unique within a fetched window; this is not validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series(Vec<DailyRecord>);

impl Series {
    pub fn new(records: Vec<DailyRecord>) -> Self {
        Self(records)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DailyRecord> {
        self.0.iter()
    }

    pub fn into_records(self) -> Vec<DailyRecord> {
        self.0
    }

    pub fn find_by_date(&self, date: NaiveDate) -> Option<&DailyRecord> {
        self.0.iter().find(|r| r.date == date)
    }

    /// The `n` most recent records, i.e. the tail of the series.
    pub fn most_recent(&self, n: usize) -> &[DailyRecord] {
        let start = self.0.len().saturating_sub(n);
        &self.0[start..]
    }

    /// Most recent record carrying a drought risk, the one the risk card shows.
    pub fn latest_with_analysis(&self) -> Option<&DailyRecord> {
        self.0.iter().rev().find(|r| r.drought_risk.is_some())
    }
}

impl From<Vec<DailyRecord>> for Series {
    fn from(records: Vec<DailyRecord>) -> Self {
        Self(records)
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a DailyRecord;
    type IntoIter = std::slice::Iter<'a, DailyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Geographic location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
    pub name: Option<String>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters: None,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Coordinate string shown when no place name is known
    pub fn coordinate_label(&self, decimals: usize) -> String {
        format!(
            "{:.*}, {:.*}",
            decimals, self.latitude, decimals, self.longitude
        )
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

impl WeatherError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload(message.into())
    }
}

impl From<WeatherError> for AppError {
    fn from(err: WeatherError) -> Self {
        match err {
            WeatherError::Network(e) => AppError::Network(e),
            WeatherError::MalformedPayload(msg) => AppError::MalformedPayload(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32, mm: f64) -> DailyRecord {
        DailyRecord::new(NaiveDate::from_ymd_opt(2024, 1, d).unwrap(), mm)
    }

    #[test]
    fn test_risk_label_parsing() {
        assert_eq!(DroughtRisk::from_label("low"), Some(DroughtRisk::Low));
        assert_eq!(DroughtRisk::from_label(" HIGH "), Some(DroughtRisk::High));
        assert_eq!(DroughtRisk::from_label("Severe"), None);
    }

    #[test]
    fn test_risk_serializes_as_label() {
        let json = serde_json::to_string(&DroughtRisk::Medium).unwrap();
        assert_eq!(json, "\"Medium\"");
    }

    #[test]
    fn test_most_recent_takes_tail() {
        let series = Series::new((1..=10).map(|d| day(d, d as f64)).collect());
        let recent = series.most_recent(7);
        assert_eq!(recent.len(), 7);
        assert_eq!(recent[0].date.to_string(), "2024-01-04");
        assert_eq!(recent[6].date.to_string(), "2024-01-10");
    }

    #[test]
    fn test_most_recent_short_series() {
        let series = Series::new(vec![day(1, 1.0), day(2, 2.0)]);
        assert_eq!(series.most_recent(7).len(), 2);
        assert!(Series::default().most_recent(7).is_empty());
    }

    #[test]
    fn test_latest_with_analysis() {
        let mut analysed = day(2, 0.0);
        analysed.drought_risk = Some(DroughtRisk::High);
        let series = Series::new(vec![day(1, 0.0), analysed, day(3, 0.0)]);
        let found = series.latest_with_analysis().unwrap();
        assert_eq!(found.date.to_string(), "2024-01-02");
        assert!(Series::new(vec![day(1, 0.0)]).latest_with_analysis().is_none());
    }

    #[test]
    fn test_latest_with_analysis_prefers_newest() {
        let mut oldest = day(1, 0.0);
        oldest.drought_risk = Some(DroughtRisk::Low);
        let mut newest = day(3, 0.0);
        newest.drought_risk = Some(DroughtRisk::High);
        let series = Series::new(vec![oldest, day(2, 0.0), newest]);

        let found = series.latest_with_analysis().unwrap();
        assert_eq!(found.date.to_string(), "2024-01-03");
        assert_eq!(found.drought_risk, Some(DroughtRisk::High));
    }

    #[test]
    fn test_coordinate_label() {
        let loc = Location::new(32.715736, -117.161087);
        assert_eq!(loc.coordinate_label(2), "32.72, -117.16");
        assert_eq!(loc.coordinate_label(4), "32.7157, -117.1611");
    }

    #[test]
    fn test_weather_error_into_app_error() {
        let app: AppError = WeatherError::malformed("missing daily").into();
        assert!(matches!(app, AppError::MalformedPayload(m) if m == "missing daily"));
    }
}
