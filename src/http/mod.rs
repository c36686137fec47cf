//! HTTP front end.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → gateway pipeline (tenant, auth, relay)
//!     → request.rs (RequestContext carried through the pipeline)
//!     → response streamed back to client
//! ```

pub mod request;
pub mod server;

pub use request::RequestContext;
pub use server::{AppState, HttpServer};
