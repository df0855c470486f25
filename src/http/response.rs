//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the upstream response to the client
//! - Stamp the mount's marker header
//!
//! # Design Decisions
//! - Status, headers and body pass through untouched
//! - The marker overrides any upstream header of the same name
//! - Streaming responses avoid buffering entire body

use axum::body::{Body, Bytes, HttpBody};
use axum::http::Response;
use axum::BoxError;

use crate::routing::Marker;

/// Turn an upstream response into the client response.
pub fn relay_response<B>(upstream: Response<B>, marker: &Marker) -> Response<Body>
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let (mut parts, body) = upstream.into_parts();
    parts
        .headers
        .insert(marker.name.clone(), marker.value.clone());
    Response::from_parts(parts, Body::new(body))
}
