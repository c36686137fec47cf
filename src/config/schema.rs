//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the tenant gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Tenant routing: strategy, targets and public paths.
    pub routing: RoutingConfig,

    /// Bearer credential verification.
    pub auth: AuthConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
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

/// Which request attribute identifies the tenant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
    /// First label of the `Host` header.
    #[default]
    Subdomain,
    /// First path segment, stripped before forwarding.
    Path,
    /// Anything else. Accepted at load time, rejected per request.
    #[serde(other)]
    Unrecognized,
}

impl RoutingMode {
    /// Parse a mode name the way the config file spells it.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "subdomain" => RoutingMode::Subdomain,
            "path" => RoutingMode::Path,
            _ => RoutingMode::Unrecognized,
        }
    }
}

impl std::fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingMode::Subdomain => write!(f, "subdomain"),
            RoutingMode::Path => write!(f, "path"),
            RoutingMode::Unrecognized => write!(f, "unrecognized"),
        }
    }
}

/// Tenant routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RoutingConfig {
    /// Routing strategy.
    pub mode: RoutingMode,

    /// Tenant id -> target origin (e.g. "http://localhost:4000").
    pub tenants: HashMap<String, String>,

    /// Tenant id -> path prefixes reachable without a credential.
    pub public_paths: HashMap<String, Vec<String>>,
}

/// Credential verification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Require a valid token on non-public paths.
    pub enabled: bool,

    /// HMAC signing secret used to verify tokens.
    pub secret: Option<String>,

    /// Name of the cookie a token may be carried in.
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            secret: None,
            cookie_name: "token".to_string(),
        }
    }
}

/// Timeout configuration for upstream connections.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { connect_secs: 5 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
