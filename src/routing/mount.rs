//! Resolved mount points.
//!
//! # Responsibilities
//! - Resolve each mount's upstream base URL once, at startup
//! - Hold the marker header stamped on relayed responses
//! - Split a request path into the segments below the mount prefix
//!
//! # Design Decisions
//! - The environment is consulted through a lookup function, never per request
//! - Path segments stay percent-encoded exactly as received
//! - Prefix matching is segment-aligned: "/api/proxyx" is not under "/api/proxy"

use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::MethodFilter;

use crate::config::validation::{parse_method, validate_upstream_url};
use crate::config::{ConfigError, MountConfig};

/// Response header identifying the mount that relayed a response.
#[derive(Debug, Clone)]
pub struct Marker {
    pub name: HeaderName,
    pub value: HeaderValue,
}

/// A mount with its upstream resolved. Immutable after construction.
#[derive(Debug, Clone)]
pub struct Mount {
    pub name: String,
    pub prefix: String,
    /// Upstream base URL, used verbatim when building targets.
    pub upstream: String,
    pub marker: Marker,
    pub methods: Vec<Method>,
}

impl Mount {
    /// Resolve a mount against the process environment.
    pub fn resolve(config: &MountConfig) -> Result<Self, ConfigError> {
        Self::resolve_with(config, |key| std::env::var(key).ok())
    }

    /// Resolve a mount using `lookup` as the environment.
    ///
    /// The first variable in `upstream_env` with a non-empty value wins;
    /// otherwise the configured default is used.
    pub fn resolve_with<F>(config: &MountConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let upstream = config
            .upstream_env
            .iter()
            .filter_map(|key| lookup(key))
            .find(|value| !value.is_empty())
            .unwrap_or_else(|| config.default_upstream.clone());

        let invalid = |reason: String| ConfigError::InvalidUpstream {
            mount: config.name.clone(),
            url: upstream.clone(),
            reason,
        };

        validate_upstream_url(&upstream).map_err(&invalid)?;

        let name = HeaderName::from_bytes(config.marker_header.as_bytes())
            .map_err(|e| invalid(format!("marker header: {e}")))?;
        let value = HeaderValue::from_str(&config.marker_value)
            .map_err(|e| invalid(format!("marker value: {e}")))?;

        let methods = config
            .methods
            .iter()
            .map(|m| parse_method(m).ok_or_else(|| invalid(format!("unsupported method '{m}'"))))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: config.name.clone(),
            prefix: config.prefix.clone(),
            upstream,
            marker: Marker { name, value },
            methods,
        })
    }

    /// Axum route pattern capturing everything below the prefix.
    pub fn route_pattern(&self) -> String {
        format!("{}/{{*path}}", self.prefix)
    }

    /// Method filter covering exactly the configured methods.
    pub fn method_filter(&self) -> Option<MethodFilter> {
        self.methods
            .iter()
            .filter_map(|m| MethodFilter::try_from(m.clone()).ok())
            .reduce(MethodFilter::or)
    }
}

/// Ordered path segments captured below a mount prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegments(Vec<String>);

impl PathSegments {
    /// Extract the segments of `path` below `prefix`.
    ///
    /// Returns `None` when the path is not under the prefix or nothing
    /// follows it.
    pub fn from_request_path(prefix: &str, path: &str) -> Option<Self> {
        let rest = path.strip_prefix(prefix)?.strip_prefix('/')?;
        if rest.is_empty() {
            return None;
        }
        Some(Self(rest.split('/').map(str::to_string).collect()))
    }

    /// Segments joined with "/".
    pub fn joined(&self) -> String {
        self.0.join("/")
    }
}

impl<S: Into<String>> FromIterator<S> for PathSegments {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
