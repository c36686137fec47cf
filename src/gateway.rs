//! The per-request decision pipeline.
//!
//! ```text
//! resolve determinant → look up target → public path? → verify credential
//!     → build RequestContext → relay
//! ```
//!
//! Each step either produces the input of the next or a terminal
//! `GatewayError`; nothing downstream is contacted before the last step.

use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use crate::auth::CredentialVerifier;
use crate::config::{GatewayConfig, RoutingMode};
use crate::error::GatewayError;
use crate::http::request::RequestContext;
use crate::observability::metrics;
use crate::relay::Forwarder;
use crate::routing::registry::TargetError;
use crate::routing::{self, TenantRegistry};

/// Immutable request-handling state shared by all connections.
#[derive(Debug)]
pub struct Gateway {
    mode: RoutingMode,
    registry: TenantRegistry,
    verifier: CredentialVerifier,
    forwarder: Forwarder,
}

impl Gateway {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, TargetError> {
        Ok(Self {
            mode: config.routing.mode.clone(),
            registry: TenantRegistry::from_config(&config.routing)?,
            verifier: CredentialVerifier::new(&config.auth),
            forwarder: Forwarder::new(Duration::from_secs(config.timeouts.connect_secs)),
        })
    }

    pub fn mode(&self) -> &RoutingMode {
        &self.mode
    }

    pub fn registry(&self) -> &TenantRegistry {
        &self.registry
    }

    /// Run one request through the pipeline.
    pub async fn handle(&self, request: Request<Body>) -> Result<Response, GatewayError> {
        let determinant = routing::resolve(&self.mode, &request)?;

        let Some(target) = self.registry.resolve_target(&determinant.tenant_id) else {
            return Err(GatewayError::UnknownTenant(determinant.tenant_id));
        };
        metrics::record_tenant_request(&determinant.tenant_id);

        let claims = if self
            .registry
            .is_public_path(&determinant.tenant_id, &determinant.rewritten_path)
        {
            tracing::debug!(
                tenant = %determinant.tenant_id,
                path = %determinant.rewritten_path,
                "Public path, skipping authentication"
            );
            None
        } else {
            self.verifier
                .authenticate(request.uri(), request.headers())
                .inspect_err(|e| metrics::record_auth_failure(e.reason()))?
        };

        let ctx = RequestContext::new(determinant, claims);

        tracing::info!(
            method = %request.method(),
            tenant = %ctx.tenant_id(),
            path = %ctx.rewritten_path(),
            target = %target,
            "Proxying request"
        );

        self.forwarder
            .forward(&ctx, target, request)
            .await
            .inspect_err(|e| {
                if matches!(e, GatewayError::UpstreamUnavailable(_)) {
                    metrics::record_upstream_error(ctx.tenant_id());
                }
            })
    }
}
