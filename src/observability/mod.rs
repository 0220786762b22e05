//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every invocation produces:
//!     → logging.rs (structured log events, one span per invocation)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stderr (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
