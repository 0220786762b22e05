//! Local HTTP front end.
//!
//! # Responsibilities
//! - Turn GET requests into invocation events
//! - Write the resulting envelope back as the HTTP response
//! - Wire up middleware (tracing, request ID)
//!
//! # Design Decisions
//! - Only `/program/{programId}` extracts a path parameter; every other path is
//!   forwarded as-is and the invocation decides whether it is supported
//! - Program events carry the path rebuilt from the decoded id, so any valid
//!   spelling of the same id (lowercase hex, raw `'` or `+`) routes alike
//! - Non-GET methods are rejected before an event is built

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::invocation::event::escape;
use crate::invocation::{InvocationContext, Proxy, ResponseEnvelope};
use crate::lifecycle::shutdown;

const X_REQUEST_ID: &str = "x-request-id";

/// HTTP server exposing the proxy routes.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(proxy: Arc<Proxy>) -> Self {
        Self {
            router: build_router(proxy),
        }
    }

    /// The configured router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn build_router(proxy: Arc<Proxy>) -> Router {
    let x_request_id = HeaderName::from_static(X_REQUEST_ID);

    Router::new()
        .route("/program/{program_id}", get(program_handler))
        .fallback(fallback_handler)
        .with_state(proxy)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
}

async fn program_handler(
    State(proxy): State<Arc<Proxy>>,
    Path(program_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let event = program_event(&program_id);
    invoke(&proxy, event, &headers).await
}

/// Event for `/program/{programId}` with the id in its canonical escaped form.
fn program_event(program_id: &str) -> Value {
    json!({
        "path": format!("/program/{}", escape(program_id)),
        "pathParameters": { "programId": program_id },
    })
}

async fn fallback_handler(
    State(proxy): State<Arc<Proxy>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if method != Method::GET {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let event = json!({
        "path": uri.path(),
        "pathParameters": null,
    });
    invoke(&proxy, event, &headers).await
}

async fn invoke(proxy: &Proxy, event: Value, headers: &HeaderMap) -> Response {
    let context = headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(InvocationContext::with_request_id)
        .unwrap_or_default();

    into_response(proxy.handle(&event, &context).await)
}

/// Convert an envelope into an HTTP response.
pub fn into_response(envelope: ResponseEnvelope) -> Response {
    let status =
        StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut response = Response::new(Body::from(envelope.body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    for (name, value) in envelope.headers.into_iter().flatten() {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Dropping invalid envelope header"),
        }
    }

    response
}
