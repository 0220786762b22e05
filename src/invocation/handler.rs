//! Invocation entry point.
//!
//! # Responsibilities
//! - Parse the event, resolve the route, drive the retry loop
//! - Turn client-input errors into 400 envelopes
//! - Wrap each invocation in a span carrying its request ID

use std::time::Instant;

use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ProxyConfig;
use crate::error::ProxyResult;
use crate::invocation::envelope::ResponseEnvelope;
use crate::invocation::event::InboundRequest;
use crate::observability::metrics;
use crate::resilience::RetryPolicy;
use crate::routing::{self, ResolvedRoute};
use crate::upstream::{classify, UpstreamClient, UpstreamError};

/// Per-invocation context supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    pub request_id: String,
}

impl InvocationContext {
    /// Context with a fresh UUID v4 request ID.
    pub fn new() -> Self {
        Self::with_request_id(Uuid::new_v4().to_string())
    }

    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

impl Default for InvocationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The proxy: immutable configuration plus a shared upstream client.
#[derive(Debug, Clone)]
pub struct Proxy {
    config: ProxyConfig,
    client: UpstreamClient,
    retry_policy: RetryPolicy,
}

impl Proxy {
    /// Create a proxy from a validated configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, UpstreamError> {
        let client = UpstreamClient::new(&config.upstream)?;
        let retry_policy = RetryPolicy::from_config(&config.retries);
        Ok(Self {
            config,
            client,
            retry_policy,
        })
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Handle one inbound event. Always produces an envelope.
    pub async fn handle(&self, event: &Value, context: &InvocationContext) -> ResponseEnvelope {
        let span = tracing::info_span!("invocation", request_id = %context.request_id);
        self.handle_inner(event).instrument(span).await
    }

    async fn handle_inner(&self, event: &Value) -> ResponseEnvelope {
        let start = Instant::now();

        let resolved = match self.prepare(event) {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected invocation");
                let envelope = ResponseEnvelope::bad_request(&e);
                metrics::record_invocation("none", envelope.status_code, start);
                return envelope;
            }
        };

        tracing::debug!(
            route = resolved.route.name(),
            url = %resolved.url,
            "Route resolved"
        );

        let client = &self.client;
        let route = &resolved;
        let envelope = self
            .retry_policy
            .run(move |_| async move { classify(client.get(route).await) })
            .await;

        tracing::info!(
            route = resolved.route.name(),
            status = envelope.status_code,
            retries = envelope.retries().unwrap_or_default(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Invocation complete"
        );
        metrics::record_invocation(resolved.route.name(), envelope.status_code, start);
        envelope
    }

    fn prepare(&self, event: &Value) -> ProxyResult<ResolvedRoute> {
        let request = InboundRequest::from_event(event)?;
        routing::resolve(&request, &self.config.upstream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn proxy() -> Proxy {
        Proxy::new(ProxyConfig::default()).unwrap()
    }

    #[test]
    fn test_context_ids_are_unique() {
        assert_ne!(InvocationContext::new(), InvocationContext::new());
        assert_eq!(InvocationContext::with_request_id("abc").request_id, "abc");
    }

    #[tokio::test]
    async fn test_missing_path_is_bad_request() {
        let envelope = proxy()
            .handle(&json!({ "pathParameters": null }), &InvocationContext::new())
            .await;

        assert_eq!(envelope.status_code, 400);
        assert!(envelope.headers.is_none());
        let message = envelope.body_json().unwrap()["message"].as_str().unwrap().to_string();
        assert!(message.starts_with("Got MissingField while parsing request: "));
    }

    #[tokio::test]
    async fn test_unsupported_route_is_not_sent_upstream() {
        let envelope = proxy()
            .handle(&json!({ "path": "/news" }), &InvocationContext::new())
            .await;

        assert_eq!(envelope.status_code, 400);
        assert_eq!(
            envelope.body,
            r#"{"message":"Route /news isn't supported by this API"}"#
        );
    }

    #[tokio::test]
    async fn test_missing_program_id() {
        let envelope = proxy()
            .handle(
                &json!({ "path": "/program/x", "pathParameters": { "id": "x" } }),
                &InvocationContext::new(),
            )
            .await;

        assert_eq!(envelope.status_code, 400);
        assert_eq!(envelope.body, r#"{"message":"Failed to find program ID"}"#);
    }
}
