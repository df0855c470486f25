//! Forwarding errors.
//!
//! Every failure on the forwarding path ends up here and becomes a plain,
//! generic error response. Upstream responses of any status are not errors
//! and never pass through this type.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failure while forwarding a single request.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Invalid upstream target '{0}'")]
    InvalidTarget(String),

    #[error("Failed to build upstream request: {0}")]
    Build(#[from] axum::http::Error),

    #[error("Failed to read request body: {0}")]
    BodyRead(axum::Error),

    #[error("Request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("Upstream did not respond within {0:?}")]
    Timeout(Duration),
}

impl ProxyError {
    /// Classify a body read failure, separating the size limit from I/O errors.
    pub fn from_body_error(err: axum::Error, limit: usize) -> Self {
        let source = err.into_inner();
        if source.is::<http_body_util::LengthLimitError>() {
            ProxyError::BodyTooLarge { limit }
        } else {
            ProxyError::BodyRead(axum::Error::new(source))
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::BodyRead(_) => StatusCode::BAD_REQUEST,
            ProxyError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::InvalidTarget(_) | ProxyError::Build(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, status = %status, "Forwarding failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }
        (status, status.canonical_reason().unwrap_or("Error")).into_response()
    }
}
