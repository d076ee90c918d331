// src/error.rs

//! Unified error handling for the relay.

use std::fmt;

use thiserror::Error;

/// Result type alias for relay operations.
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

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Upstream source could not be reached (network, timeout, bad status)
    #[error("Source {source_label} unreachable: {message}")]
    SourceUnreachable {
        source_label: String,
        message: String,
    },

    /// Upstream answered with something that is not an `aaData` payload
    #[error("Malformed payload from {source_label}: {message}")]
    MalformedPayload {
        source_label: String,
        message: String,
    },

    /// Seen-set backing store failed
    #[error("Seen store error: {0}")]
    Store(String),

    /// Destination identifier is not a valid channel address
    #[error("Invalid channel address '{0}'")]
    Address(String),

    /// Transport refused or failed a delivery
    #[error("Delivery to {destination} failed: {message}")]
    Delivery {
        destination: String,
        message: String,
    },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a source-unreachable error.
    pub fn unreachable(source_label: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::SourceUnreachable {
            source_label: source_label.into(),
            message: message.to_string(),
        }
    }

    /// Create a malformed-payload error.
    pub fn malformed(source_label: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::MalformedPayload {
            source_label: source_label.into(),
            message: message.to_string(),
        }
    }

    /// Create a seen-store error.
    pub fn store(message: impl fmt::Display) -> Self {
        Self::Store(message.to_string())
    }

    /// Create a delivery error for one destination.
    pub fn delivery(destination: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Delivery {
            destination: destination.into(),
            message: message.to_string(),
        }
    }
}
