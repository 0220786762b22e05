//! Translation proxy for the GLZ content API.
//!
//! Maps a small set of caller-facing routes onto GLZ API endpoints, retries
//! failed upstream calls a bounded number of times and always answers with a
//! uniform `{statusCode, body, headers}` envelope.

pub mod config;
pub mod error;
pub mod http;
pub mod invocation;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod upstream;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use invocation::{InvocationContext, Proxy, ResponseEnvelope};
pub use lifecycle::Shutdown;
