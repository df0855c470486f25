//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap the upstream call with an optional deadline
//! - Cancel the in-flight call cleanly when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from transport errors
//! - Timed-out requests return 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

use crate::error::ProxyError;

/// Run `fut`, failing with [`ProxyError::Timeout`] if `deadline` elapses first.
pub async fn with_deadline<F, T, E>(deadline: Option<Duration>, fut: F) -> Result<T, ProxyError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<ProxyError>,
{
    match deadline {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(ProxyError::Timeout(limit)),
        },
        None => fut.await.map_err(Into::into),
    }
}
