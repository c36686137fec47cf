//! Multi-tenant reverse proxy gateway library.

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod routing;

pub use config::schema::GatewayConfig;
pub use error::{ConfigurationError, GatewayError};
pub use gateway::Gateway;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
