//! Per-request context.
//!
//! # Responsibilities
//! - Carry the resolved tenant, rewritten path and verified claims through
//!   the pipeline as one value
//!
//! # Design Decisions
//! - Built once, after authentication; no setters
//! - Claims are either the full decoded payload or absent, never partial

use serde_json::Value;

use crate::routing::Determinant;

/// Resolved state of one inbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    tenant_id: String,
    rewritten_path: String,
    claims: Option<Value>,
}

impl RequestContext {
    pub fn new(determinant: Determinant, claims: Option<Value>) -> Self {
        Self {
            tenant_id: determinant.tenant_id,
            rewritten_path: determinant.rewritten_path,
            claims,
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Path and query forwarded downstream.
    pub fn rewritten_path(&self) -> &str {
        &self.rewritten_path
    }

    pub fn claims(&self) -> Option<&Value> {
        self.claims.as_ref()
    }

    /// Claims serialized for the identity header; `null` when absent.
    pub fn payload_json(&self) -> String {
        match &self.claims {
            Some(claims) => claims.to_string(),
            None => Value::Null.to_string(),
        }
    }
}
