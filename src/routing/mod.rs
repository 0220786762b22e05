//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! InboundRequest (path, escaped program id)
//!     → router.rs (build RouteTable, exact lookup)
//!     → Return: ResolvedRoute (upstream URL + query) or UnsupportedRoute
//! ```
//!
//! # Design Decisions
//! - Table rebuilt per invocation from static templates
//! - Deterministic: same input always resolves to the same upstream call

pub mod router;

pub use router::{resolve, ResolvedRoute, Route, RouteTable};
