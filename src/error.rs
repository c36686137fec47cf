//! Gateway error taxonomy and its mapping onto client responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Server-side misconfiguration detected while handling a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("routing mode is not recognized")]
    UnknownRoutingMode,

    #[error("auth is enabled but no signing secret is configured")]
    MissingSigningSecret,
}

/// Terminal outcome of the request pipeline.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("server configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("no target configured for tenant '{0}'")]
    UnknownTenant(String),

    #[error("no valid credential presented")]
    Unauthenticated,

    #[error("target service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("inbound request stream failed: {0}")]
    ClientStream(String),

    #[error("cannot build outbound request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    /// Status code sent to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::UnknownTenant(_) | GatewayError::UpstreamUnavailable(_) => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::Unauthenticated => StatusCode::UNAUTHORIZED,
            // The client is usually gone by the time this is produced.
            GatewayError::ClientStream(_) | GatewayError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    /// Body text sent to the client. Never includes internal detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            GatewayError::Configuration(_) => "Server Configuration Error",
            GatewayError::UnknownTenant(_) => "Bad Gateway: Unknown Target",
            GatewayError::Unauthenticated => "Unauthorized",
            GatewayError::UpstreamUnavailable(_) => "Bad Gateway: Target service unavailable",
            GatewayError::ClientStream(_) | GatewayError::InvalidRequest(_) => "Bad Request",
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Configuration(_) => "configuration",
            GatewayError::UnknownTenant(_) => "unknown_tenant",
            GatewayError::Unauthenticated => "unauthenticated",
            GatewayError::UpstreamUnavailable(_) => "upstream_unavailable",
            GatewayError::ClientStream(_) => "client_stream",
            GatewayError::InvalidRequest(_) => "invalid_request",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}
