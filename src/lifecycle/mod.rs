//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → broadcast to every subscribed server
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT or broadcast → graceful shutdown
//!     → axum stops accepting, in-flight requests finish
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
