//! Invocation subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound event (JSON: path, pathParameters?)
//!     → event.rs (parse, escape programId)         ─┐
//!     → routing (exact lookup, query params)        ├→ 400 envelope on error
//!     → resilience::retries ↔ upstream (attempts)  ─┘
//!     → envelope.rs (statusCode, body, headers)
//! ```

pub mod envelope;
pub mod event;
pub mod handler;

pub use envelope::{ResponseEnvelope, RETRIES_HEADER};
pub use event::InboundRequest;
pub use handler::{InvocationContext, Proxy};
