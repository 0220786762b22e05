//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use glz_api_proxy::{Proxy, ProxyConfig};
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

/// Build a proxy pointed at a mock upstream, with a short backoff.
pub fn proxy_for(server: &MockServer) -> Proxy {
    proxy_for_uri(&server.uri())
}

/// Build a proxy pointed at `uri`, with a short backoff.
pub fn proxy_for_uri(uri: &str) -> Proxy {
    let mut config = ProxyConfig::default();
    config.upstream.base_url = format!("{uri}/umbraco/api");
    config.retries.backoff_ms = 5;
    Proxy::new(config).expect("proxy should build")
}

/// Base URI of a local port nothing is listening on.
pub fn unused_local_uri() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Responds with `failure` for the first `failures` calls, then with `success`.
pub struct FailThenSucceed {
    pub calls: Arc<AtomicU32>,
    pub failures: u32,
    pub failure: ResponseTemplate,
    pub success: ResponseTemplate,
}

impl FailThenSucceed {
    pub fn new(failures: u32, failure: ResponseTemplate, success: ResponseTemplate) -> Self {
        Self {
            calls: Arc::new(AtomicU32::new(0)),
            failures,
            failure,
            success,
        }
    }
}

impl Respond for FailThenSucceed {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let count = self.calls.fetch_add(1, Ordering::SeqCst);
        if count < self.failures {
            self.failure.clone()
        } else {
            self.success.clone()
        }
    }
}
