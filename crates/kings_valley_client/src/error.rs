//! Game API error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Category of a failed game service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ApiErrorKind {
    /// Room or game missing, or the room already started.
    #[display("not found")]
    NotFound,
    /// Room already has two players.
    #[display("room full")]
    RoomFull,
    /// The service rejected a move.
    #[display("invalid move")]
    InvalidMove,
    /// Transport failure, unexpected status or unreadable payload.
    #[display("network error")]
    Network,
}

/// Game API error with location tracking.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Game API error ({}): {} at {}:{}", kind, message, file, line)]
pub struct ApiError {
    /// Error category.
    pub kind: ApiErrorKind,
    /// Diagnostic detail.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ApiError {
    /// Creates a new API error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for a [`ApiErrorKind::Network`] error.
    #[track_caller]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    /// Whether this error is of `kind`.
    pub fn is(&self, kind: ApiErrorKind) -> bool {
        self.kind == kind
    }
}

impl From<reqwest::Error> for ApiError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::network(format!("HTTP transport error: {}", err))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
