//! Local HTTP front end.
//!
//! # Data Flow
//! ```text
//! GET request
//!     → server.rs (request ID, build event from path)
//!     → Proxy::handle
//!     → envelope → HTTP response (status, JSON body, headers)
//! ```

pub mod server;

pub use server::HttpServer;
