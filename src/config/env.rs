//! Environment overrides.
//!
//! Deployments configure tenants through delimiter-separated variables:
//!
//! ```text
//! PROXY_SERVICES      codec=http://localhost:4000;user=http://localhost:5000
//! PROXY_PUBLIC_PATHS  codec=/api/v1/login,/api/v2/login;user=/api/v1/register
//! ROUTING_MODE        subdomain | path
//! JWT_ENABLED         "true" enables verification
//! JWT_SECRET          HMAC secret
//! JWT_COOKIE_NAME     cookie carrying the token (default "token")
//! GATEWAY_BIND_ADDRESS, GATEWAY_PORT
//! ```
//!
//! String splitting lives here only; everything downstream sees typed maps.

use std::collections::HashMap;

use crate::config::schema::{GatewayConfig, RoutingMode};

pub const PROXY_SERVICES: &str = "PROXY_SERVICES";
pub const PROXY_PUBLIC_PATHS: &str = "PROXY_PUBLIC_PATHS";
pub const ROUTING_MODE: &str = "ROUTING_MODE";
pub const JWT_ENABLED: &str = "JWT_ENABLED";
pub const JWT_SECRET: &str = "JWT_SECRET";
pub const JWT_COOKIE_NAME: &str = "JWT_COOKIE_NAME";
pub const GATEWAY_BIND_ADDRESS: &str = "GATEWAY_BIND_ADDRESS";
pub const GATEWAY_PORT: &str = "GATEWAY_PORT";

/// Apply overrides from the process environment.
pub fn apply_process_env(config: &mut GatewayConfig) {
    apply_env_overrides(config, |key| std::env::var(key).ok());
}

/// Apply overrides using `lookup` to read variables.
///
/// Variables that are unset leave the corresponding field untouched.
/// Tenant maps from the environment are merged over the file's maps.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(PROXY_SERVICES) {
        let services = parse_services(&raw);
        tracing::debug!(count = services.len(), "Tenant targets read from environment");
        config.routing.tenants.extend(services);
    }

    if let Some(raw) = lookup(PROXY_PUBLIC_PATHS) {
        config.routing.public_paths.extend(parse_public_paths(&raw));
    }

    if let Some(raw) = lookup(ROUTING_MODE) {
        config.routing.mode = RoutingMode::from_name(&raw);
    }

    if let Some(raw) = lookup(JWT_ENABLED) {
        config.auth.enabled = raw == "true";
    }

    if let Some(secret) = lookup(JWT_SECRET) {
        config.auth.secret = (!secret.is_empty()).then_some(secret);
    }

    if let Some(name) = lookup(JWT_COOKIE_NAME) {
        if !name.is_empty() {
            config.auth.cookie_name = name;
        }
    }

    if let Some(addr) = lookup(GATEWAY_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }

    if let Some(port) = lookup(GATEWAY_PORT) {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{}:{}", host, port.trim());
    }
}

/// Parse `id=url` entries separated by `,` or `;`.
pub fn parse_services(raw: &str) -> HashMap<String, String> {
    raw.split([',', ';'])
        .filter_map(|entry| {
            let (id, url) = entry.split_once('=')?;
            let (id, url) = (id.trim(), url.trim());
            if id.is_empty() || url.is_empty() {
                tracing::warn!(entry = %entry, "Ignoring malformed service entry");
                return None;
            }
            Some((id.to_string(), url.to_string()))
        })
        .collect()
}

/// Parse `id=/a,/b` entries separated by `;`.
pub fn parse_public_paths(raw: &str) -> HashMap<String, Vec<String>> {
    raw.split(';')
        .filter_map(|entry| {
            let (id, paths) = entry.split_once('=')?;
            let paths = paths
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
            Some((id.trim().to_string(), paths))
        })
        .filter(|(id, _)| !id.is_empty())
        .collect()
}
