//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (optional deadline on the exchange)
//!     → on failure: surfaced as-is, no retry
//! ```
//!
//! # Design Decisions
//! - Each request is attempted exactly once
//! - A deadline is opt-in; without one the transport's behavior applies

pub mod timeouts;

pub use timeouts::with_deadline;
