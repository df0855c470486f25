//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → tracing.rs (span with correlation ID)
//!     → forwarding path emits structured events inside the span
//!     → logging.rs (subscriber: filter + fmt/JSON output)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Request ID flows through every event of a request
//! - No metrics: the proxy reports through logs only

pub mod logging;
pub mod tracing;
