//! Summary figures shown on the dashboard stat cards.

use chrono::NaiveDate;

use crate::types::Series;

/// Number of most recent days summed for the weekly total
pub const RECENT_WINDOW_DAYS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SeriesStats {
    pub total_precipitation: f64,
    pub average_precipitation: f64,
    pub last_7_days_total: f64,
    pub today_precipitation: f64,
}

impl SeriesStats {
    /// Compute every figure from the series. `today` picks the record for the
    /// "today" card; a series without that date reports 0.
    pub fn compute(series: &Series, today: NaiveDate) -> Self {
        let total_precipitation: f64 = series.iter().map(|r| r.precipitation_mm).sum();

        let average_precipitation = if series.is_empty() {
            0.0
        } else {
            total_precipitation / series.len() as f64
        };

        let last_7_days_total = series
            .most_recent(RECENT_WINDOW_DAYS)
            .iter()
            .map(|r| r.precipitation_mm)
            .sum();

        let today_precipitation = series
            .find_by_date(today)
            .map(|r| r.precipitation_mm)
            .unwrap_or(0.0);

        Self {
            total_precipitation,
            average_precipitation,
            last_7_days_total,
            today_precipitation,
        }
    }

    pub fn today_label(&self) -> String {
        format!("{:.1} mm", self.today_precipitation)
    }

    pub fn average_label(&self) -> String {
        format!("{:.2} mm", self.average_precipitation)
    }

    pub fn last_7_days_label(&self) -> String {
        format!("{:.1} mm", self.last_7_days_total)
    }
}
