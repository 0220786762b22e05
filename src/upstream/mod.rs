//! Upstream (GLZ API) subsystem.
//!
//! # Data Flow
//! ```text
//! ResolvedRoute
//!     → client.rs (GET with static headers, typed failures)
//!     → classify.rs (Outcome: envelope + success flag)
//!     → resilience::retries decides whether to go again
//! ```

pub mod classify;
pub mod client;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub use classify::{classify, Outcome};
pub use client::{UpstreamClient, UpstreamResponse};

/// Diagnostics attached to a response whose body was not JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDiagnostics {
    #[serde(skip)]
    pub detail: String,
    pub response_headers: BTreeMap<String, String>,
    pub response_body: String,
    pub request_headers: BTreeMap<String, String>,
    pub request_params: Map<String, Value>,
    pub request_url: String,
}

/// Failures of a single upstream attempt.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The request could not be sent or the response could not be read.
    #[error("Failed to request from GLZ API: {0}")]
    Transport(String),

    /// The upstream answered with an error status.
    #[error("Bad response from GLZ API: {detail}")]
    Status { status: u16, detail: String },

    /// The upstream answered with a body that is not JSON.
    #[error("Failed to parse JSON from GLZ API response: {}", .0.detail)]
    InvalidJson(Box<ResponseDiagnostics>),

    /// The HTTP client could not be constructed.
    #[error("Failed to build GLZ API client: {0}")]
    Client(String),
}

impl UpstreamError {
    /// HTTP status code reported to the caller for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            UpstreamError::Status { .. } => 503,
            UpstreamError::Transport(_)
            | UpstreamError::InvalidJson(_)
            | UpstreamError::Client(_) => 500,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Status { .. } => "status",
            UpstreamError::InvalidJson(_) => "invalid_json",
            UpstreamError::Client(_) => "client",
        }
    }
}
