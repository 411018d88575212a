use thiserror::Error;

use crate::prompt::fallback;

/// The three ways a completion call can fail, as far as a visitor is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    RateLimited,
    Unauthorized,
    Unknown,
}

impl FailureKind {
    /// Text appended to the transcript in place of a reply.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::RateLimited => fallback::RATE_LIMITED,
            Self::Unauthorized => fallback::UNAUTHORIZED,
            Self::Unknown => fallback::UNKNOWN,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimited => "rate_limited",
            Self::Unauthorized => "unauthorized",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Rate limited ({status}): {message}")]
    RateLimited { status: u16, message: String },

    #[error("Unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Missing API key: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("Service error ({status}): {message}")]
    Service { status: u16, message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Request cancelled before a reply arrived")]
    Cancelled,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AssistantError {
    pub fn service(status: u16, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            message: message.into(),
        }
    }

    /// Collapse any error onto the visitor-facing classification.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::RateLimited { .. } => FailureKind::RateLimited,
            Self::Unauthorized { .. } | Self::MissingCredential(_) => FailureKind::Unauthorized,
            Self::Service { .. }
            | Self::Timeout
            | Self::Cancelled
            | Self::Http(_)
            | Self::Json(_)
            | Self::Io(_)
            | Self::Config(_) => FailureKind::Unknown,
        }
    }
}

pub type Result<T> = std::result::Result<T, AssistantError>;
