//! Bearer credential authentication.
//!
//! # Data Flow
//! ```text
//! Request (Authorization header, ?token=, Cookie)
//!     → sources.rs (locate candidate tokens, fixed order)
//!     → token.rs (signature + expiry check, decode claims)
//!     → verifier.rs (first success wins, failures fall through)
//!     → Return: claims or AuthError
//! ```

pub mod error;
pub mod sources;
pub mod token;
pub mod verifier;

pub use error::AuthError;
pub use sources::CredentialSource;
pub use token::{InvalidToken, TokenVerifier};
pub use verifier::CredentialVerifier;
