//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate mount prefixes, methods and marker headers
//! - Validate upstream URLs and the bind address
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue, Method};
use url::Url;

use crate::config::schema::{MountConfig, ProxyConfig};

/// Methods a mount may route.
pub const SUPPORTED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `mounts[0].prefix`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.mounts.is_empty() {
        errors.push(ValidationError::new("mounts", "at least one mount is required"));
    }

    let mut prefixes = HashSet::new();
    for (i, mount) in config.mounts.iter().enumerate() {
        validate_mount(i, mount, &mut errors);
        if !prefixes.insert(mount.prefix.as_str()) {
            errors.push(ValidationError::new(
                format!("mounts[{i}].prefix"),
                format!("duplicate prefix '{}'", mount.prefix),
            ));
        }
    }

    if config.upstream.timeout_secs == Some(0) {
        errors.push(ValidationError::new(
            "upstream.timeout_secs",
            "must be greater than zero",
        ));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::new(
            "limits.max_body_bytes",
            "must be greater than zero",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_mount(i: usize, mount: &MountConfig, errors: &mut Vec<ValidationError>) {
    let field = |name: &str| format!("mounts[{i}].{name}");

    if mount.name.trim().is_empty() {
        errors.push(ValidationError::new(field("name"), "must not be empty"));
    }

    let prefix = mount.prefix.as_str();
    if !prefix.starts_with('/') || prefix.len() < 2 {
        errors.push(ValidationError::new(
            field("prefix"),
            "must start with '/' and name at least one segment",
        ));
    } else if prefix.ends_with('/') {
        errors.push(ValidationError::new(field("prefix"), "must not end with '/'"));
    }
    if prefix.contains(['{', '}', '*']) || prefix.split('/').any(|s| s.starts_with(':')) {
        errors.push(ValidationError::new(
            field("prefix"),
            "must not contain route parameters or wildcards",
        ));
    }

    if let Err(message) = validate_upstream_url(&mount.default_upstream) {
        errors.push(ValidationError::new(field("default_upstream"), message));
    }

    if HeaderName::from_bytes(mount.marker_header.as_bytes()).is_err() {
        errors.push(ValidationError::new(
            field("marker_header"),
            format!("'{}' is not a valid header name", mount.marker_header),
        ));
    }
    if HeaderValue::from_str(&mount.marker_value).is_err() {
        errors.push(ValidationError::new(
            field("marker_value"),
            "is not a valid header value",
        ));
    }

    if mount.methods.is_empty() {
        errors.push(ValidationError::new(field("methods"), "must not be empty"));
    }
    for method in &mount.methods {
        if parse_method(method).is_none() {
            errors.push(ValidationError::new(
                field("methods"),
                format!("unsupported method '{method}'"),
            ));
        }
    }
}

/// Parse a configured method name against the supported set.
pub fn parse_method(name: &str) -> Option<Method> {
    SUPPORTED_METHODS
        .iter()
        .find(|m| m.as_str().eq_ignore_ascii_case(name))
        .cloned()
}

/// Check that a base URL is something the outbound client can reach.
///
/// Both `http` and `https` are accepted.
pub fn validate_upstream_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| format!("'{raw}' is not a valid URL: {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err(format!("'{raw}' has no host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(format!("'{raw}' must not carry a query or fragment"));
    }
    Ok(())
}
