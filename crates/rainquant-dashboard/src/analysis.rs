//! AI analysis seam.
//!
//! The analysis backend is an external capability with no defined contract
//! beyond "series in, annotated series or failure out". Nothing here infers
//! what the annotations mean.

use rainquant_core::AppError;
use rainquant_weather::Series;

#[allow(async_fn_in_trait)]
pub trait AnalysisBackend {
    async fn run_analysis(&self, series: &Series) -> Result<Series, AppError>;
}

/// Backend used when no analysis service is configured. Always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredAnalysis;

impl AnalysisBackend for UnconfiguredAnalysis {
    async fn run_analysis(&self, _series: &Series) -> Result<Series, AppError> {
        Err(AppError::analysis("no analysis backend configured"))
    }
}
