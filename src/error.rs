// src/error.rs

//! Unified error handling for the stock monitor.

use std::fmt;

use thiserror::Error;

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A page could not be fetched or read
    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Pages were read but no stock items were recognised
    #[error("No stock items found on the monitored pages")]
    EmptyResult,

    /// The messaging endpoint rejected the message or was unreachable
    #[error("Notify error: {0}")]
    Notify(String),

    /// AWS S3 error
    #[cfg(feature = "s3")]
    #[error("S3 error: {0}")]
    S3(String),

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

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a fetch error for the given page URL.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a notification error.
    pub fn notify(message: impl fmt::Display) -> Self {
        Self::Notify(message.to_string())
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error happened while acquiring the current snapshot.
    ///
    /// These are reported through the notifier instead of aborting the run.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::EmptyResult)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failures_are_classified() {
        assert!(AppError::fetch("https://example.com", "timeout").is_fetch_failure());
        assert!(AppError::EmptyResult.is_fetch_failure());
        assert!(!AppError::notify("403 Forbidden").is_fetch_failure());
        assert!(!AppError::config("BOT_TOKEN is not set").is_fetch_failure());
    }

    #[test]
    fn test_fetch_error_display() {
        let err = AppError::fetch("https://shop.example/list", "HTTP status 502");
        assert_eq!(
            err.to_string(),
            "Fetch failed for https://shop.example/list: HTTP status 502"
        );
    }
}
