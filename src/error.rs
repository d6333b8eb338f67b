//! Error types for the linkscout crate

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for linkscout operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for collaborator calls and configuration
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

/// Why a pipeline run ended without metadata.
///
/// The `Display` output is the message shown next to the input field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Nothing (or only whitespace) was submitted
    #[error("URL is required")]
    EmptyInput,

    /// Input is not a scheme-prefixed ftp/http/https URL
    #[error("Invalid URL")]
    InvalidSyntax,

    /// Threat match, or the fetch service refused the page
    #[error("Malicious URL. Try with a different URL.")]
    MaliciousUrl,

    /// The fetch service could not be reached
    #[error("Could not fetch the page: {0}")]
    FetchFailure(String),

    /// The threat service could not be reached or answered garbage
    #[error("Could not reach the threat service: {0}")]
    ThreatServiceFailure(String),
}

/// Serializable tag for a [`PipelineError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EmptyInput,
    InvalidSyntax,
    MaliciousUrl,
    FetchFailure,
    ThreatServiceFailure,
}

impl PipelineError {
    /// The tag of this error, without its payload
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInput => ErrorKind::EmptyInput,
            Self::InvalidSyntax => ErrorKind::InvalidSyntax,
            Self::MaliciousUrl => ErrorKind::MaliciousUrl,
            Self::FetchFailure(_) => ErrorKind::FetchFailure,
            Self::ThreatServiceFailure(_) => ErrorKind::ThreatServiceFailure,
        }
    }

    /// Whether the error was decided without any network call
    pub fn is_local(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::InvalidSyntax)
    }
}
