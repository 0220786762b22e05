//! Lifecycle management for `serve`.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → server stops accepting → in-flight invocations finish → exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
