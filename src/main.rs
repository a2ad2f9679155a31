use anyhow::Result;
use rainquant_dashboard::view::{chart_points, stat_cards, table_rows};
use rainquant_dashboard::{ActionOutcome, Dashboard, FileSettingsStore, UnconfiguredAnalysis};
use rainquant_weather::{CachedLocationSensor, ConfiguredSensor, RiskDisplay};

#[tokio::main]
async fn main() -> Result<()> {
    rainquant_core::init()?;

    let (config, _) = rainquant_core::Config::load_validated()?;
    let store = FileSettingsStore::new(config.settings_path());
    let sensor = CachedLocationSensor::new(ConfiguredSensor::from_config(&config.location));

    let mut dashboard = Dashboard::from_config(&config, sensor, UnconfiguredAnalysis, store)?;
    dashboard.load().await;

    if dashboard.fetch_weather().await == ActionOutcome::Failed {
        tracing::warn!("Showing dashboard without fresh data");
    }

    let state = dashboard.state();
    let active = state.active_location();

    println!("RainQuant - Rainfall Analysis");
    print!("Location: {}", active.name);
    if active.auto_detected {
        print!(" (auto-detected)");
    }
    println!();
    if let Some(at) = state.last_fetch {
        println!("Last updated: {}", at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M"));
    }
    if let Some(alert) = &state.alert {
        println!("[{:?}] {}", alert.kind, alert.text);
    }

    println!();
    for card in stat_cards(&state.series, dashboard.today()) {
        println!("  {:<18} {}", card.title, card.value);
    }

    if let Some(record) = state.series.latest_with_analysis() {
        let risk = RiskDisplay::for_risk(record.drought_risk);
        println!("\n{} ({})", risk.label, record.date.format("%b %-d, %Y"));
        if let Some(explanation) = &record.ai_explanation {
            println!("  {}", explanation);
        }
        for suggestion in &record.ai_suggestions {
            println!("  - {}", suggestion);
        }
    }

    let points = chart_points(&state.series);
    if points.is_empty() {
        println!("\nNo rainfall data available yet.");
        return Ok(());
    }

    let peak = points
        .iter()
        .map(|p| p.precipitation_mm)
        .fold(0.0_f64, f64::max);
    println!("\nRainfall trend (mm)");
    for point in &points {
        let width = if peak > 0.0 {
            (point.precipitation_mm / peak * 40.0).round() as usize
        } else {
            0
        };
        println!("  {:>6} {:>6.1} {}", point.label, point.precipitation_mm, "#".repeat(width));
    }

    println!("\n  {:<12} {:>7} {:>8} {:>8}  Risk", "Date", "mm", "Max", "Min");
    for row in table_rows(&state.series).iter().rev() {
        let risk = row.risk.map(|(r, _)| r.as_str()).unwrap_or("-");
        println!(
            "  {:<12} {:>7} {:>8} {:>8}  {}",
            row.date, row.precipitation, row.temperature_max, row.temperature_min, risk
        );
    }

    Ok(())
}
