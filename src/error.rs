//! Error types for the directory client and the profile aggregator.
//!
//! [`HttpError`] is what a single GET against the directory can fail with.
//! [`AggregationError`] is the domain-level classification the renderer sees.

use thiserror::Error;

/// Failure of a single directory request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpError {
    /// The server answered with a non-2xx status.
    #[error("directory returned HTTP {status}")]
    Status { status: u16 },

    /// No response was received (DNS, connect, TLS, reset, ...).
    #[error("request failed: {0}")]
    Transport(String),

    /// A 2xx response whose body was not the JSON we expected.
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl HttpError {
    /// The numeric status code, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status } => Some(*status),
            HttpError::Transport(_) | HttpError::Decode(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            HttpError::Status {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            HttpError::Decode(err.to_string())
        } else {
            HttpError::Transport(err.to_string())
        }
    }
}

/// Why a profile could not be assembled.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AggregationError {
    /// The primary user resource does not exist.
    #[error("no such user exists: {login}")]
    NotFound { login: String },

    /// Anything else: network failure, unexpected status, malformed body,
    /// or a failed dependent fetch.
    #[error("failed to fetch profile data: {reason}")]
    Transient { reason: String },
}

impl AggregationError {
    pub fn transient(reason: impl std::fmt::Display) -> Self {
        AggregationError::Transient {
            reason: reason.to_string(),
        }
    }

    /// Message shown to the user in place of the profile.
    pub fn user_message(&self) -> &'static str {
        match self {
            AggregationError::NotFound { .. } => "No such user exists",
            AggregationError::Transient { .. } => "An error occurred while fetching the data",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AggregationError::NotFound { .. })
    }
}
