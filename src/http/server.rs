//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with a single catch-all handler
//! - Wire up middleware (request ID, tracing)
//! - Serve on a bound listener until shutdown is signalled
//! - Turn pipeline failures into responses and log them

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::observability::metrics;
use crate::routing::registry::TargetError;

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}

/// HTTP front end of the gateway.
pub struct HttpServer {
    router: Router,
    gateway: Arc<Gateway>,
}

impl HttpServer {
    /// Build the server and its request pipeline from `config`.
    pub fn new(config: &GatewayConfig) -> Result<Self, TargetError> {
        let gateway = Arc::new(Gateway::from_config(config)?);
        let state = AppState {
            gateway: gateway.clone(),
        };

        Ok(Self {
            router: Self::build_router(state),
            gateway,
        })
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(gateway_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight
    /// requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mode = %self.gateway.mode(),
            tenants = self.gateway.registry().len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }
}

/// Catch-all handler: every method, every path.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = match state.gateway.handle(request).await {
        Ok(response) => response,
        Err(e) => {
            log_failure(&e, &method, &path);
            e.into_response()
        }
    };

    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

fn log_failure(error: &GatewayError, method: &str, path: &str) {
    match error {
        GatewayError::Configuration(_) | GatewayError::UpstreamUnavailable(_) => {
            tracing::error!(
                method = %method,
                path = %path,
                kind = error.kind(),
                error = %error,
                "Request failed"
            );
        }
        _ => {
            tracing::warn!(
                method = %method,
                path = %path,
                kind = error.kind(),
                error = %error,
                "Request rejected"
            );
        }
    }
}
