//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Mount compilation (at startup):
//!     MountConfig[]
//!     → mount.rs (resolve upstream from env, parse marker and methods)
//!     → Freeze as immutable Mount, one Axum route each
//!
//! Per request:
//!     request path → PathSegments below the mount prefix
//! ```
//!
//! # Design Decisions
//! - Mounts resolved at startup, immutable at runtime
//! - Prefix matching only, no regex
//! - Method filtering delegated to the Axum router

pub mod mount;

pub use mount::{Marker, Mount, PathSegments};
