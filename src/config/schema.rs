//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the forwarding proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Mount points, each forwarding a path prefix to one upstream.
    pub mounts: Vec<MountConfig>,

    /// Outbound call settings.
    pub upstream: UpstreamConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            mounts: default_mounts(),
            upstream: UpstreamConfig::default(),
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// A path prefix forwarded to a single upstream service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MountConfig {
    /// Mount identifier for logging.
    pub name: String,

    /// Fixed path prefix, e.g. "/api/proxy". Everything below it is forwarded.
    pub prefix: String,

    /// Environment variables consulted in order for the upstream base URL.
    #[serde(default)]
    pub upstream_env: Vec<String>,

    /// Base URL used when none of `upstream_env` is set.
    pub default_upstream: String,

    /// Response header stamped on every relayed response.
    #[serde(default = "default_marker_header")]
    pub marker_header: String,

    /// Value of the marker header.
    #[serde(default = "default_marker_value")]
    pub marker_value: String,

    /// HTTP methods routed to this mount.
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,
}

impl MountConfig {
    /// The general-purpose API mount.
    pub fn api() -> Self {
        Self {
            name: "proxy".to_string(),
            prefix: "/api/proxy".to_string(),
            upstream_env: vec!["API_URL".to_string()],
            default_upstream: "http://localhost:8000".to_string(),
            marker_header: default_marker_header(),
            marker_value: default_marker_value(),
            methods: default_methods(),
        }
    }

    /// The ML service mount. Read-and-submit only.
    pub fn ml() -> Self {
        Self {
            name: "ml".to_string(),
            prefix: "/api/ml".to_string(),
            upstream_env: vec!["ML_URL".to_string(), "NEXT_PUBLIC_ML_URL".to_string()],
            default_upstream: "http://localhost:8088".to_string(),
            marker_header: "x-proxied-ml".to_string(),
            marker_value: default_marker_value(),
            methods: vec!["GET".to_string(), "POST".to_string()],
        }
    }
}

fn default_mounts() -> Vec<MountConfig> {
    vec![MountConfig::api(), MountConfig::ml()]
}

fn default_marker_header() -> String {
    "x-proxied-by".to_string()
}

fn default_marker_value() -> String {
    "skinzai".to_string()
}

fn default_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "PATCH", "DELETE"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

/// Outbound call configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Bound on the whole upstream exchange (send + response head), in seconds.
    /// Unset means no proxy-level deadline.
    pub timeout_secs: Option<u64>,
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound body buffered for forwarding, in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 16 * 1024 * 1024, // 16MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}
