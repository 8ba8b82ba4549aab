//! Error types for azprompt
//!
//! Every failure propagates to `main` as an [`AppError`]. Nothing is retried
//! or swallowed; the category decides the process exit code.

use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing {what}: set the {name} environment variable")]
    MissingSetting {
        name: &'static str,
        what: &'static str,
    },

    #[error("Failed to read config file {path}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration in {path}: {reason}")]
    ConfigValidationFailed { path: String, reason: String },

    #[error("Authentication rejected by {endpoint} (HTTP {status}): {body}")]
    Authentication {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Request to {endpoint} failed")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Service at {endpoint} returned HTTP {status}: {body}")]
    Service {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Response from {endpoint} is not valid JSON")]
    MalformedResponse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write output")]
    Output(#[from] std::io::Error),
}

/// Coarse failure classes used for exit codes and log fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Authentication,
    Transport,
    Service,
    Response,
    Output,
}

impl ErrorCategory {
    /// Lowercase label for structured logging
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Authentication => "authentication",
            Self::Transport => "transport",
            Self::Service => "service",
            Self::Response => "response",
            Self::Output => "output",
        }
    }
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_)
            | Self::MissingSetting { .. }
            | Self::ConfigFileRead { .. }
            | Self::ConfigParseFailed { .. }
            | Self::ConfigValidationFailed { .. } => ErrorCategory::Configuration,
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::Service { .. } => ErrorCategory::Service,
            Self::MalformedResponse { .. } => ErrorCategory::Response,
            Self::Output(_) => ErrorCategory::Output,
        }
    }

    /// Process exit code for this error (never 0)
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::Output => 1,
            ErrorCategory::Configuration => 2,
            ErrorCategory::Authentication => 3,
            ErrorCategory::Transport => 4,
            ErrorCategory::Service => 5,
            ErrorCategory::Response => 6,
        }
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;
