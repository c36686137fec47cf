//! Relay subsystem: forwards a resolved request to its tenant target.
//!
//! # Data Flow
//! ```text
//! RequestContext + TargetOrigin + inbound Request
//!     → forwarder.rs (rewrite head, Host + proxy-payload)
//!     → upload.rs (pump inbound body → outbound body, own task)
//!     → hyper-util client (outbound request)
//!     → forwarder.rs (status + headers verbatim, body streamed back)
//! ```
//!
//! # Design Decisions
//! - Nothing is buffered in full; both bodies stream frame by frame
//! - Cancellation follows ownership: dropping the handler or the response
//!   body aborts whatever is still running
//! - No retries

pub mod forwarder;
pub mod upload;

/// Header carrying the JSON-encoded claims (or `null`) downstream.
pub const PROXY_PAYLOAD_HEADER: &str = "proxy-payload";

pub use forwarder::{build_outbound, Forwarder};
pub use upload::{spawn_upload, UploadBody, UploadError, UploadTask};
