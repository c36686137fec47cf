//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path, query)
//!     → determinant.rs (tenant id + rewritten path)
//!     → registry.rs (target origin, public-path check)
//!     → Return: TargetOrigin or UnknownTenant
//!
//! Registry Compilation (at startup):
//!     RoutingConfig
//!     → Parse target origins
//!     → Build public-path matchers
//!     → Freeze as immutable TenantRegistry
//! ```
//!
//! # Design Decisions
//! - Registry compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always resolves the same way

pub mod determinant;
pub mod registry;

pub use determinant::{resolve, Determinant};
pub use registry::{TargetOrigin, TenantRegistry};
