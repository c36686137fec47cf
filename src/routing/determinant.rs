//! Tenant determinant resolution.
//!
//! # Responsibilities
//! - Derive the tenant id from the host label or the first path segment
//! - Produce the path (with query) to forward downstream
//!
//! # Design Decisions
//! - Pure function of (mode, uri, headers); no allocation beyond the result
//! - PATH mode strips the leading segment by index, so a segment that
//!   recurs later in the path is left alone
//! - A missing determinant yields an empty tenant id; the registry lookup
//!   rejects it

use axum::http::{header, HeaderMap, Request, Uri};

use crate::config::RoutingMode;
use crate::error::ConfigurationError;

/// Outcome of determinant resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Determinant {
    /// Tenant identifier, possibly empty.
    pub tenant_id: String,
    /// Path and query string to send downstream.
    pub rewritten_path: String,
}

/// Resolve the tenant and downstream path for a request.
pub fn resolve<B>(mode: &RoutingMode, request: &Request<B>) -> Result<Determinant, ConfigurationError> {
    resolve_parts(mode, request.uri(), request.headers())
}

/// Resolve from the request's URI and headers.
pub fn resolve_parts(
    mode: &RoutingMode,
    uri: &Uri,
    headers: &HeaderMap,
) -> Result<Determinant, ConfigurationError> {
    match mode {
        RoutingMode::Subdomain => Ok(by_subdomain(uri, headers)),
        RoutingMode::Path => Ok(by_path(uri)),
        RoutingMode::Unrecognized => Err(ConfigurationError::UnknownRoutingMode),
    }
}

fn by_subdomain(uri: &Uri, headers: &HeaderMap) -> Determinant {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or("");

    let tenant_id = host.split('.').next().unwrap_or("").to_string();
    let rewritten_path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    Determinant {
        tenant_id,
        rewritten_path,
    }
}

fn by_path(uri: &Uri) -> Determinant {
    let (segment, remainder) = split_leading_segment(uri.path());

    let mut rewritten_path = if remainder.is_empty() {
        "/".to_string()
    } else {
        remainder.to_string()
    };
    if let Some(query) = uri.query() {
        rewritten_path.push('?');
        rewritten_path.push_str(query);
    }

    Determinant {
        tenant_id: segment.to_string(),
        rewritten_path,
    }
}

/// Split `/first/rest` into `("first", "/rest")`.
fn split_leading_segment(path: &str) -> (&str, &str) {
    let rest = path.strip_prefix('/').unwrap_or(path);
    match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    }
}
