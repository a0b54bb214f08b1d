// src/error.rs

//! Unified error handling for the tracker client.

use std::fmt;

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Server answered with a non-success HTTP status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Server answered 2xx but the envelope carried a failure code
    #[error("Request rejected (code {code}): {message}")]
    Rejected { code: i64, message: String },

    /// Missing or expired credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Envelope succeeded but carried no payload
    #[error("Missing data in response: {0}")]
    MissingData(String),

    /// Raw input was not the expected collection shape
    #[error("Invalid input shape: {0}")]
    InvalidShape(String),

    /// A wait on the server gave up
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create an API error from an HTTP status.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an envelope rejection error.
    pub fn rejected(code: i64, message: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            message: message.into(),
        }
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Create a missing data error for the given request context.
    pub fn missing_data(context: impl Into<String>) -> Self {
        Self::MissingData(context.into())
    }

    /// Create an invalid shape error.
    pub fn invalid_shape(what: impl Into<String>, found: impl fmt::Display) -> Self {
        Self::InvalidShape(format!("{}: found {}", what.into(), found))
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the error means the credentials were rejected.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}
