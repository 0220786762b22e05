//! Uniform response envelope returned by every invocation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::ProxyError;

/// Header carrying the number of retries taken before the returned result.
pub const RETRIES_HEADER: &str = "X-Sane-GLZ-API-Proxy-Retries";

/// `{statusCode, body, headers?}` as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,

    /// Serialized JSON document.
    pub body: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
}

impl ResponseEnvelope {
    /// Build an envelope around a JSON value.
    pub fn json(status_code: u16, body: &Value) -> Self {
        Self {
            status_code,
            body: body.to_string(),
            headers: None,
        }
    }

    /// Build an envelope whose body is `{"message": ...}`.
    pub fn message(status_code: u16, message: impl Into<String>) -> Self {
        Self::json(status_code, &json!({ "message": message.into() }))
    }

    /// Build an envelope whose body is `{"message": ...}` followed by extra fields.
    pub fn message_with(
        status_code: u16,
        message: impl Into<String>,
        extra: Map<String, Value>,
    ) -> Self {
        let mut body = Map::new();
        body.insert("message".into(), Value::String(message.into()));
        body.extend(extra);
        Self::json(status_code, &Value::Object(body))
    }

    /// Envelope for a client-input error (400).
    pub fn bad_request(error: &ProxyError) -> Self {
        Self::message(400, error.to_string())
    }

    /// Replace the header set with the retries annotation.
    pub fn with_retries(mut self, retries: u32) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(RETRIES_HEADER.to_string(), retries.to_string());
        self.headers = Some(headers);
        self
    }

    /// Retries annotation, if present.
    pub fn retries(&self) -> Option<u32> {
        self.headers
            .as_ref()
            .and_then(|h| h.get(RETRIES_HEADER))
            .and_then(|v| v.parse().ok())
    }

    /// Decode the body back into JSON.
    pub fn body_json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_in_camel_case() {
        let envelope = ResponseEnvelope::message(400, "Failed to find program ID");
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["statusCode"], 400);
        assert_eq!(value["body"], r#"{"message":"Failed to find program ID"}"#);
        assert!(value.get("headers").is_none());
    }

    #[test]
    fn test_with_retries_sets_header() {
        let envelope = ResponseEnvelope::message(503, "down").with_retries(2);
        assert_eq!(envelope.retries(), Some(2));
        assert_eq!(envelope.headers.unwrap()[RETRIES_HEADER], "2");
    }

    #[test]
    fn test_message_comes_first() {
        let mut extra = Map::new();
        extra.insert("requestUrl".into(), json!("https://example.com"));
        let envelope = ResponseEnvelope::message_with(500, "bad", extra);
        assert!(envelope.body.starts_with(r#"{"message":"bad""#));
    }
}
