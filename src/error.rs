// Error handling module
// Defines the failures a credential fetch can produce

use thiserror::Error;

use crate::auth::Credential;

/// Errors that can occur while fetching a credential from the provider
#[derive(Error, Debug)]
pub enum FetchError {
    /// Provider could not be reached, or answered with a non-success status
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider answered with a non-zero errcode
    ///
    /// The decoded credential is kept for diagnostics only and must not be cached.
    #[error("Remote error: {code}: {message}")]
    Remote {
        code: i64,
        message: String,
        credential: Credential,
    },

    /// Response body was not the expected JSON shape
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Dependent fetch was invoked without its upstream credential
    #[error("Missing upstream credential")]
    MissingUpstream,
}

impl FetchError {
    /// Short label used in structured log fields
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(e) if e.is_timeout() => "timeout",
            FetchError::Transport(e) if e.is_connect() => "connection_failed",
            FetchError::Transport(e) if e.is_status() => "http_status",
            FetchError::Transport(_) => "transport",
            FetchError::Remote { .. } => "remote",
            FetchError::Parse(_) => "parse",
            FetchError::MissingUpstream => "missing_upstream",
        }
    }
}

/// Result type alias for fetch operations
pub type Result<T> = std::result::Result<T, FetchError>;
