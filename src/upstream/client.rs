//! HTTP client for the GLZ API.
//!
//! # Responsibilities
//! - Send GET requests with the static header set
//! - Map transport, status and body failures to [`UpstreamError`]
//!
//! # Design Decisions
//! - One pooled `reqwest::Client` per process, headers built once
//! - No timeout unless configured
//! - The body is read as text first so it can be reported when it is not JSON
//! - HTTP/1.1 only. Over HTTP/2 hyper drops the connection-specific `Connection`
//!   and `Host` headers, and the diagnostics' `requestHeaders` would list
//!   headers that never went on the wire

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, CONNECTION, HOST, USER_AGENT,
};
use serde_json::{Map, Value};
use url::Url;

use crate::config::UpstreamConfig;
use crate::routing::ResolvedRoute;
use crate::upstream::{ResponseDiagnostics, UpstreamError};

/// A successful upstream response.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Value,
}

/// GET-only client bound to the upstream host.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    headers: HeaderMap,
}

impl UpstreamClient {
    /// Create a client for the configured upstream.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let headers = static_headers(config)?;

        let mut builder = reqwest::Client::builder().http1_only();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;

        Ok(Self { client, headers })
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Execute one GET against the resolved upstream endpoint.
    pub async fn get(&self, route: &ResolvedRoute) -> Result<UpstreamResponse, UpstreamError> {
        tracing::debug!(url = %route.url, query = ?route.query, "Requesting GLZ API");

        let response = self
            .client
            .get(&route.url)
            .query(&route.query)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        if let Err(e) = response.error_for_status_ref() {
            return Err(UpstreamError::Status {
                status: response.status().as_u16(),
                detail: e.to_string(),
            });
        }

        let status = response.status().as_u16();
        let response_headers = header_map(response.headers());
        let text = response
            .text()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        match serde_json::from_str(&text) {
            Ok(body) => Ok(UpstreamResponse { status, body }),
            Err(e) => Err(UpstreamError::InvalidJson(Box::new(ResponseDiagnostics {
                detail: e.to_string(),
                response_headers,
                response_body: text,
                request_headers: header_map(&self.headers),
                request_params: route
                    .query
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect::<Map<_, _>>(),
                request_url: route.url.clone(),
            }))),
        }
    }
}

fn static_headers(config: &UpstreamConfig) -> Result<HeaderMap, UpstreamError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| UpstreamError::Client(format!("invalid base URL: {e}")))?;
    let host = match (base.host_str(), base.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => return Err(UpstreamError::Client("base URL has no host".into())),
    };

    let value = |raw: &str| {
        HeaderValue::from_str(raw)
            .map_err(|e| UpstreamError::Client(format!("invalid header value '{raw}': {e}")))
    };

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(HOST, value(&host)?);
    headers.insert(USER_AGENT, value(&config.user_agent)?);
    Ok(headers)
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}
