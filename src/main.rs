//! Multi-tenant reverse proxy gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                      GATEWAY                         │
//!                 │                                                      │
//!  Client ────────┼─▶ http server ─▶ routing ─▶ auth ─▶ relay ──────────┼──▶ Tenant
//!  Request        │   (request id,   (tenant,   (bearer  (stream up,     │    service
//!                 │    tracing)       target)    token)   stream down)   │
//!  Client ◀───────┼─────────────────────────────────────── relay ◀──────┼─── Response
//!                 │                                                      │
//!                 │   config · observability · lifecycle                 │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use tenant_gateway::config::{
    read_effective_config, validation::validate_config, ConfigError, ObservabilityConfig,
};
use tenant_gateway::http::HttpServer;
use tenant_gateway::lifecycle::{signals, BootSequence, BoxError, Shutdown};
use tenant_gateway::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "tenant-gateway", version, about = "Multi-tenant reverse proxy gateway")]
struct Args {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = read_effective_config(args.config.as_deref())?;
    logging::init_logging(&config.observability.log_level);

    tracing::info!("tenant-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        mode = %config.routing.mode,
        tenants = config.routing.tenants.len(),
        auth_enabled = config.auth.enabled,
        connect_timeout_secs = config.timeouts.connect_secs,
        "Configuration loaded"
    );

    let server = HttpServer::new(&config)?;
    if server.gateway().registry().is_empty() {
        tracing::warn!("No tenants configured; every request will be rejected with 502");
    }

    let targets: Vec<(String, String)> = server
        .gateway()
        .registry()
        .targets()
        .map(|(tenant, target)| (tenant.to_string(), target.to_string()))
        .collect();
    let observability = config.observability.clone();

    BootSequence::new()
        .step("tenant-registry", move || async move {
            for (tenant, target) in targets {
                tracing::info!(tenant = %tenant, target = %target, "Tenant registered");
            }
            Ok(())
        })
        .step("metrics-exporter", move || install_metrics(observability))
        .run()
        .await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn install_metrics(observability: ObservabilityConfig) -> Result<(), BoxError> {
    if !observability.metrics_enabled {
        tracing::debug!("Metrics exporter disabled");
        return Ok(());
    }
    let addr: SocketAddr = observability.metrics_address.parse()?;
    metrics::init_metrics(addr)?;
    Ok(())
}
