//! Centralized error types for RainQuant.
//!
//! Every dashboard action converts its failure into an [`AppError`] at the
//! action boundary. The variants follow the categories the UI distinguishes:
//! - network failures (transport errors, timeouts, non-2xx responses)
//! - malformed provider payloads
//! - location unavailable (sensor denied or timed out)
//! - validation errors on form input
//!
//! Use `user_message()` for a short banner-friendly message and the
//! `Display` impl for logs.

use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::MalformedPayload(_) => {
                "Received unexpected weather data. Please try again."
            }
            AppError::Location(e) => e.user_message(),
            AppError::Validation(_) => "Some fields are invalid. Check your input.",
            AppError::Storage(_) => "Failed to save settings",
            AppError::Analysis(_) => "Failed to run AI analysis. Please try again.",
            AppError::Io(_) => "A file operation failed. Please try again.",
        }
    }

    /// Create a storage error from any message.
    pub fn storage(message: impl Into<String>) -> Self {
        AppError::Storage(message.into())
    }

    /// Create an analysis error from any message.
    pub fn analysis(message: impl Into<String>) -> Self {
        AppError::Analysis(message.into())
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Device location errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
}

impl LocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::PermissionDenied => "Location permission was denied.",
            LocationError::ServiceUnavailable => "Location services are unavailable.",
            LocationError::Timeout => "Location detection timed out.",
        }
    }
}

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
