//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every tenant target is a usable origin
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Report suspicious but servable settings as warnings
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Unknown routing mode and a missing signing secret are per-request
//!   failures (500), so they only warn here

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, RoutingMode};
use crate::routing::registry::TargetOrigin;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("tenant '{tenant}': {reason}")]
    Target { tenant: String, reason: String },

    #[error("tenant '{tenant}': public path '{path}' must start with '/'")]
    PublicPath { tenant: String, path: String },

    #[error("tenant '{0}': public path '/' would make every path public")]
    PublicRoot(String),

    #[error("auth cookie name must not be empty")]
    CookieName,

    #[error("connect timeout must be greater than zero")]
    ConnectTimeout,

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),
}

/// Validate a loaded configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    for (tenant, target) in &config.routing.tenants {
        if let Err(e) = TargetOrigin::parse(target) {
            errors.push(ValidationError::Target {
                tenant: tenant.clone(),
                reason: e.to_string(),
            });
        }
    }

    for (tenant, paths) in &config.routing.public_paths {
        for path in paths.iter().filter(|p| !p.starts_with('/')) {
            errors.push(ValidationError::PublicPath {
                tenant: tenant.clone(),
                path: path.clone(),
            });
        }
        if paths.iter().any(|p| p == "/") {
            errors.push(ValidationError::PublicRoot(tenant.clone()));
        }
        if !config.routing.tenants.contains_key(tenant) {
            tracing::warn!(tenant = %tenant, "Public paths configured for tenant without a target");
        }
    }

    if config.auth.cookie_name.trim().is_empty() {
        errors.push(ValidationError::CookieName);
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ConnectTimeout);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.routing.mode == RoutingMode::Unrecognized {
        tracing::warn!("Routing mode is not recognized; every request will fail with 500");
    }

    if config.auth.enabled && config.auth.secret.as_deref().map_or(true, str::is_empty) {
        tracing::warn!("Auth is enabled without a signing secret; protected paths will fail with 500");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
