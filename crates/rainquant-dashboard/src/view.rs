//! Read-only projections of the state for rendering.

use chrono::NaiveDate;
use rainquant_weather::{BadgeColors, DailyRecord, DroughtRisk, RiskDisplay, Series, SeriesStats};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
    pub icon: &'static str,
    pub icon_color: &'static str,
}

/// The four cards above the chart, in display order.
pub fn stat_cards(series: &Series, today: NaiveDate) -> [StatCard; 4] {
    let stats = SeriesStats::compute(series, today);
    let risk = series.latest_with_analysis().and_then(|r| r.drought_risk);
    let risk_display = RiskDisplay::for_risk(risk);

    [
        StatCard {
            title: "Today's Rainfall",
            value: stats.today_label(),
            icon: "today",
            icon_color: "#60a5fa",
        },
        StatCard {
            title: "Average Daily",
            value: stats.average_label(),
            icon: "water-drop",
            icon_color: "#a78bfa",
        },
        StatCard {
            title: "Last 7 Days",
            value: stats.last_7_days_label(),
            icon: "opacity",
            icon_color: "#06b6d4",
        },
        StatCard {
            title: "Drought Risk",
            value: risk.map_or_else(|| risk_display.label.to_string(), |r| r.to_string()),
            icon: "warning",
            icon_color: risk_display.color,
        },
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    /// Axis label, e.g. "Jan 2"
    pub label: String,
    pub precipitation_mm: f64,
    pub date: NaiveDate,
}

pub fn chart_points(series: &Series) -> Vec<ChartPoint> {
    series
        .iter()
        .map(|r| ChartPoint {
            label: r.date.format("%b %-d").to_string(),
            precipitation_mm: r.precipitation_mm,
            date: r.date,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub date: String,
    pub precipitation: String,
    pub temperature_max: String,
    pub temperature_min: String,
    pub risk: Option<(DroughtRisk, BadgeColors)>,
}

fn temperature(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |t| format!("{:.1}°C", t))
}

impl From<&DailyRecord> for TableRow {
    fn from(record: &DailyRecord) -> Self {
        Self {
            date: record.date.format("%b %-d, %Y").to_string(),
            precipitation: format!("{:.1}", record.precipitation_mm),
            temperature_max: temperature(record.temperature_max_c),
            temperature_min: temperature(record.temperature_min_c),
            risk: record
                .drought_risk
                .map(|risk| (risk, BadgeColors::for_risk(risk))),
        }
    }
}

pub fn table_rows(series: &Series) -> Vec<TableRow> {
    series.iter().map(TableRow::from).collect()
}
