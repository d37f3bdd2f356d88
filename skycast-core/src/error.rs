use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures raised while talking to the weather API over HTTP.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// The server answered with a non-success status.
    #[error("{url} returned status {status}: {body}")]
    Status { url: String, status: u16, body: String },

    /// The body could not be decoded as JSON.
    #[error("response from {url} is not valid JSON: {message}")]
    Decode { url: String, message: String },
}

#[derive(Debug, Error)]
pub enum WeatherError {
    /// Missing credential or unusable settings. Fatal, reported before any request.
    #[error("{0}")]
    Configuration(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The provider answered, but not in the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid location: {0}")]
    InvalidLocation(String),
}

impl WeatherError {
    pub(crate) fn malformed(what: impl Into<String>) -> Self {
        WeatherError::MalformedResponse(what.into())
    }

    /// Whether the failure is recovered into an [`ErrorReport`] instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WeatherError::Transport(_) | WeatherError::MalformedResponse(_)
        )
    }
}

/// Displayable error value handed back to callers in place of a result.
///
/// Serializes as `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error: String,
}

impl ErrorReport {
    pub fn new(context: &str, err: &WeatherError) -> Self {
        Self {
            error: format!("{context}: {err}"),
        }
    }
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.error)
    }
}
