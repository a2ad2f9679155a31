//! Display mapping for drought risk labels.
//!
//! The risk value comes from an external analysis step; nothing here looks at
//! precipitation.

use crate::types::DroughtRisk;

/// Color, icon and label for the drought risk card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskDisplay {
    pub color: &'static str,
    pub icon: &'static str,
    pub label: &'static str,
    pub background: &'static str,
}

impl RiskDisplay {
    pub fn for_risk(risk: Option<DroughtRisk>) -> Self {
        match risk {
            Some(DroughtRisk::Low) => Self {
                color: "#10b981",
                icon: "check-circle",
                label: "Low Risk",
                background: "#d1fae5",
            },
            Some(DroughtRisk::Medium) => Self {
                color: "#f59e0b",
                icon: "warning",
                label: "Medium Risk",
                background: "#fef3c7",
            },
            Some(DroughtRisk::High) => Self {
                color: "#ef4444",
                icon: "error",
                label: "High Risk",
                background: "#fee2e2",
            },
            None => Self {
                color: "#6b7280",
                icon: "info",
                label: "Analyzing...",
                background: "#f3f4f6",
            },
        }
    }

    /// Same mapping for a free-text label; unknown labels take the absent row.
    pub fn for_label(label: Option<&str>) -> Self {
        Self::for_risk(label.and_then(DroughtRisk::from_label))
    }
}

/// Data table badge colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeColors {
    pub background: &'static str,
    pub text: &'static str,
    pub border: &'static str,
}

impl BadgeColors {
    pub fn for_risk(risk: DroughtRisk) -> Self {
        match risk {
            DroughtRisk::Low => Self {
                background: "#d1fae5",
                text: "#065f46",
                border: "#10b981",
            },
            DroughtRisk::Medium => Self {
                background: "#fef3c7",
                text: "#92400e",
                border: "#f59e0b",
            },
            DroughtRisk::High => Self {
                background: "#fee2e2",
                text: "#991b1b",
                border: "#ef4444",
            },
        }
    }
}
