//! Request spans and correlation IDs.
//!
//! # Responsibilities
//! - Open one span per inbound request
//! - Carry the caller's `x-request-id`, or a generated UUID v4
//!
//! # Design Decisions
//! - The ID lives only in the span; the forwarded request and the relayed
//!   response are not modified

use axum::body::Body;
use axum::http::Request;
use tracing::Span;
use uuid::Uuid;

/// Header carrying a caller-supplied correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Correlation ID for a request.
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Span factory for `TraceLayer::make_span_with`.
pub fn make_request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request_id(request),
        method = %request.method(),
        path = %request.uri().path(),
    )
}
