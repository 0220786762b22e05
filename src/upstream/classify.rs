//! Outcome classification.
//!
//! Turns the result of one upstream attempt into the envelope the caller would
//! see, plus whether the attempt counts as a success.

use serde_json::{Map, Value};

use crate::invocation::envelope::ResponseEnvelope;
use crate::upstream::{UpstreamError, UpstreamResponse};

/// Envelope produced by one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub envelope: ResponseEnvelope,
    pub success: bool,
}

impl Outcome {
    pub fn success(envelope: ResponseEnvelope) -> Self {
        Self {
            envelope,
            success: true,
        }
    }

    pub fn failure(envelope: ResponseEnvelope) -> Self {
        Self {
            envelope,
            success: false,
        }
    }
}

/// Classify the result of one upstream attempt.
pub fn classify(result: Result<UpstreamResponse, UpstreamError>) -> Outcome {
    let error = match result {
        Ok(response) => {
            return Outcome::success(ResponseEnvelope::json(response.status, &response.body))
        }
        Err(error) => error,
    };

    let envelope = match &error {
        UpstreamError::InvalidJson(diagnostics) => {
            let extra = match serde_json::to_value(&**diagnostics) {
                Ok(Value::Object(fields)) => fields,
                _ => Map::new(),
            };
            ResponseEnvelope::message_with(error.status_code(), error.to_string(), extra)
        }
        _ => ResponseEnvelope::message(error.status_code(), error.to_string()),
    };
    Outcome::failure(envelope)
}
