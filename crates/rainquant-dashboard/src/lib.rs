//! RainQuant dashboard: view state, settings and the actions that drive them.

pub mod analysis;
pub mod controller;
pub mod settings;
pub mod state;
pub mod view;

pub use analysis::{AnalysisBackend, UnconfiguredAnalysis};
pub use controller::{ActionOutcome, Dashboard};
pub use settings::{FileSettingsStore, MemorySettingsStore, Settings, SettingsForm, SettingsStore};
pub use state::{ActionKind, ActiveLocation, Alert, AlertKind, DashboardState, InFlight};
