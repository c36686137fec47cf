//! Tenant target lookup and public-path matching.
//!
//! # Responsibilities
//! - Store each tenant's parsed target origin
//! - Answer whether a rewritten path is exempt from authentication
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) tenant lookup via HashMap
//! - O(n) prefix scan per tenant (lists are short)
//! - Explicit None rather than a fallback target

use std::collections::HashMap;

use axum::http::uri::{Authority, Scheme};
use thiserror::Error;
use url::Url;

use crate::config::RoutingConfig;

/// Why a target string is not a usable origin.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("invalid target url '{0}'")]
    Url(String),
    #[error("unsupported scheme '{0}', only http is relayed")]
    Scheme(String),
    #[error("target '{0}' has no host")]
    Host(String),
    #[error("target '{0}' must be an origin without path or query")]
    NotAnOrigin(String),
}

/// A parsed downstream origin (scheme + host + port).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOrigin {
    scheme: Scheme,
    authority: Authority,
}

impl TargetOrigin {
    /// Parse an origin such as `http://localhost:4000`.
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let url = Url::parse(raw).map_err(|_| TargetError::Url(raw.to_string()))?;

        if url.scheme() != "http" {
            return Err(TargetError::Scheme(url.scheme().to_string()));
        }
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| TargetError::Host(raw.to_string()))?;
        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(TargetError::NotAnOrigin(raw.to_string()));
        }

        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let authority = authority
            .parse::<Authority>()
            .map_err(|_| TargetError::Url(raw.to_string()))?;

        Ok(Self {
            scheme: Scheme::HTTP,
            authority,
        })
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// Host and optional port, as sent in the `Host` header.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }
}

impl std::fmt::Display for TargetOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)
    }
}

/// Matches a path against one public prefix on a segment boundary.
#[derive(Debug, Clone)]
pub struct PublicPathMatcher {
    prefix: String,
}

impl PublicPathMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// True when `path` equals the prefix or continues it with `/`.
    ///
    /// A prefix that already ends in `/` (e.g. `/static/`) matches anything
    /// below it. A bare `/` would match every path and is rejected by
    /// config validation.
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || self.prefix.ends_with('/'),
            None => false,
        }
    }
}

/// Immutable tenant registry built once at boot.
#[derive(Debug, Default)]
pub struct TenantRegistry {
    targets: HashMap<String, TargetOrigin>,
    public_paths: HashMap<String, Vec<PublicPathMatcher>>,
}

impl TenantRegistry {
    /// Build the registry from routing configuration.
    pub fn from_config(config: &RoutingConfig) -> Result<Self, TargetError> {
        let targets = config
            .tenants
            .iter()
            .map(|(tenant, raw)| Ok((tenant.clone(), TargetOrigin::parse(raw)?)))
            .collect::<Result<HashMap<_, _>, TargetError>>()?;

        let public_paths = config
            .public_paths
            .iter()
            .map(|(tenant, prefixes)| {
                let matchers = prefixes.iter().map(PublicPathMatcher::new).collect();
                (tenant.clone(), matchers)
            })
            .collect();

        Ok(Self {
            targets,
            public_paths,
        })
    }

    /// Look up the tenant's target origin.
    pub fn resolve_target(&self, tenant_id: &str) -> Option<&TargetOrigin> {
        self.targets.get(tenant_id)
    }

    /// Whether `rewritten_path` is reachable without a credential.
    ///
    /// The query string is ignored.
    pub fn is_public_path(&self, tenant_id: &str, rewritten_path: &str) -> bool {
        let path = rewritten_path
            .split_once('?')
            .map_or(rewritten_path, |(path, _)| path);

        self.public_paths
            .get(tenant_id)
            .is_some_and(|matchers| matchers.iter().any(|m| m.matches(path)))
    }

    /// Tenant ids and their targets, for startup logging.
    pub fn targets(&self) -> impl Iterator<Item = (&str, &TargetOrigin)> {
        self.targets.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
