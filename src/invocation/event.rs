//! Inbound event parsing.
//!
//! # Responsibilities
//! - Extract `path` and `pathParameters` from the raw event
//! - Percent-encode the `programId` path parameter
//!
//! # Design Decisions
//! - One error variant per failed step instead of a catch-all
//! - Absent, `null` and empty `pathParameters` all mean "no program id"
//! - `/` is left unescaped in the program id, everything else outside the
//!   unreserved set is percent-encoded

use serde_json::{Map, Value};

use crate::error::{ParseErrorKind, ProxyError, ProxyResult};

const PATH_FIELD: &str = "path";
const PATH_PARAMETERS_FIELD: &str = "pathParameters";
const PROGRAM_ID_PARAMETER: &str = "programId";

/// A parsed inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    pub path: String,

    /// Percent-encoded program id, when the event carried one.
    pub program_id: Option<String>,
}

impl InboundRequest {
    /// Parse a raw invocation event.
    pub fn from_event(event: &Value) -> ProxyResult<Self> {
        let (path, params) = extract(event)?;

        let program_id = match params {
            Some(params) if !params.is_empty() => Some(escaped_program_id(params)?),
            _ => None,
        };

        Ok(Self { path, program_id })
    }
}

fn extract(event: &Value) -> ProxyResult<(String, Option<&Map<String, Value>>)> {
    let object = event.as_object().ok_or_else(|| {
        ProxyError::parse(
            ParseErrorKind::InvalidEvent,
            format!("expected an object, got {}", type_name(event)),
        )
    })?;

    let path = match object.get(PATH_FIELD) {
        Some(Value::String(path)) => path.clone(),
        Some(other) => {
            return Err(ProxyError::parse(
                ParseErrorKind::InvalidField,
                format!("`{PATH_FIELD}` must be a string, got {}", type_name(other)),
            ))
        }
        None => {
            return Err(ProxyError::parse(
                ParseErrorKind::MissingField,
                format!("missing field `{PATH_FIELD}`"),
            ))
        }
    };

    let params = match object.get(PATH_PARAMETERS_FIELD) {
        None | Some(Value::Null) => None,
        Some(Value::Object(params)) => Some(params),
        Some(other) => {
            return Err(ProxyError::parse(
                ParseErrorKind::InvalidField,
                format!(
                    "`{PATH_PARAMETERS_FIELD}` must be an object, got {}",
                    type_name(other)
                ),
            ))
        }
    };

    Ok((path, params))
}

fn escaped_program_id(params: &Map<String, Value>) -> ProxyResult<String> {
    match params.get(PROGRAM_ID_PARAMETER) {
        Some(Value::String(id)) => Ok(escape(id)),
        _ => Err(ProxyError::MissingProgramId),
    }
}

/// Percent-encode a path segment, keeping `/` as-is.
pub fn escape(raw: &str) -> String {
    urlencoding::encode(raw).replace("%2F", "/")
}

/// Reverse of [`escape`].
pub fn unescape(escaped: &str) -> ProxyResult<String> {
    urlencoding::decode(escaped)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| ProxyError::MissingProgramId)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_only() {
        let request = InboundRequest::from_event(&json!({ "path": "/schedule" })).unwrap();
        assert_eq!(request.path, "/schedule");
        assert_eq!(request.program_id, None);

        let request = InboundRequest::from_event(&json!({
            "path": "/programmes",
            "pathParameters": null
        }))
        .unwrap();
        assert_eq!(request.program_id, None);

        let request = InboundRequest::from_event(&json!({
            "path": "/programmes",
            "pathParameters": {}
        }))
        .unwrap();
        assert_eq!(request.program_id, None);
    }

    #[test]
    fn test_program_id_is_escaped() {
        let request = InboundRequest::from_event(&json!({
            "path": "/program/a%20b",
            "pathParameters": { "programId": "a b" }
        }))
        .unwrap();
        assert_eq!(request.program_id.as_deref(), Some("a%20b"));
    }

    #[test]
    fn test_missing_path() {
        let err = InboundRequest::from_event(&json!({ "pathParameters": null })).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(
            err.to_string(),
            "Got MissingField while parsing request: missing field `path`"
        );
    }

    #[test]
    fn test_wrong_shapes() {
        let err = InboundRequest::from_event(&json!("just a string")).unwrap_err();
        assert!(matches!(
            err,
            ProxyError::Parse { kind: ParseErrorKind::InvalidEvent, .. }
        ));

        let err = InboundRequest::from_event(&json!({ "path": 7 })).unwrap_err();
        assert!(matches!(
            err,
            ProxyError::Parse { kind: ParseErrorKind::InvalidField, .. }
        ));

        let err = InboundRequest::from_event(&json!({
            "path": "/schedule",
            "pathParameters": ["programId"]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("`pathParameters` must be an object"));
    }

    #[test]
    fn test_missing_program_id() {
        let err = InboundRequest::from_event(&json!({
            "path": "/program/x",
            "pathParameters": { "other": "x" }
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "Failed to find program ID");

        let err = InboundRequest::from_event(&json!({
            "path": "/program/1",
            "pathParameters": { "programId": 1 }
        }))
        .unwrap_err();
        assert!(matches!(err, ProxyError::MissingProgramId));
    }

    #[test]
    fn test_escape_round_trip() {
        for raw in ["plain", "with space", "a/b", "שלום", "x&y=z?"] {
            assert_eq!(unescape(&escape(raw)).unwrap(), raw);
        }
        assert_eq!(escape("a/b c"), "a/b%20c");
        assert_eq!(escape("safe-_.~"), "safe-_.~");
    }
}
