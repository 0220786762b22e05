//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! ResolvedRoute
//!     → retries.rs (attempt → classify → stop on success or ceiling)
//!     → ResponseEnvelope annotated with the retry counter
//! ```
//!
//! # Design Decisions
//! - Only GET is proxied, so every upstream failure is safe to retry
//! - Client-input errors never reach this layer
//! - Attempts are strictly sequential; no circuit breaker

pub mod retries;

pub use retries::RetryPolicy;
