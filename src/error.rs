//! Error taxonomy for a single invocation.
//!
//! Client-input errors (`Parse`, `MissingProgramId`, `UnsupportedRoute`) end the
//! invocation immediately with a 400. Upstream errors are produced per attempt
//! and are subject to retries.

use thiserror::Error;

use crate::upstream::UpstreamError;

/// Kind of failure encountered while reading the inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The event is not a JSON object.
    InvalidEvent,
    /// A required field is absent.
    MissingField,
    /// A field is present but has the wrong shape.
    InvalidField,
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ParseErrorKind::InvalidEvent => "InvalidEvent",
            ParseErrorKind::MissingField => "MissingField",
            ParseErrorKind::InvalidField => "InvalidField",
        };
        f.write_str(name)
    }
}

/// Errors that can end an invocation.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The inbound event could not be parsed.
    #[error("Got {kind} while parsing request: {detail}")]
    Parse { kind: ParseErrorKind, detail: String },

    /// `pathParameters` was given but carried no usable `programId`.
    #[error("Failed to find program ID")]
    MissingProgramId,

    /// The path is not one of the supported routes.
    #[error("Route {0} isn't supported by this API")]
    UnsupportedRoute(String),

    /// An upstream attempt failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ProxyError {
    pub(crate) fn parse(kind: ParseErrorKind, detail: impl Into<String>) -> Self {
        ProxyError::Parse {
            kind,
            detail: detail.into(),
        }
    }

    /// HTTP status code reported to the caller for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ProxyError::Parse { .. }
            | ProxyError::MissingProgramId
            | ProxyError::UnsupportedRoute(_) => 400,
            ProxyError::Upstream(e) => e.status_code(),
        }
    }

    /// Whether another attempt may produce a different result.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProxyError::Upstream(_))
    }
}

/// Result type for proxy operations.
pub type ProxyResult<T> = Result<T, ProxyError>;
