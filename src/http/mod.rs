//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, per-mount wildcard routes)
//!     → request.rs (target URL, header filtering, body policy)
//!     → upstream call (hyper client, redirects not followed)
//!     → response.rs (marker header, streamed body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use server::HttpServer;
