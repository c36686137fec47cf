//! Signed token verification.
//!
//! Tokens are HMAC-signed JWTs. `exp` and `nbf` are enforced when present
//! with no leeway; a token without `exp` never expires. Audience and issuer
//! are not checked. The decoded payload is returned as opaque JSON.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use thiserror::Error;

/// Verification failure. Bad signature, expiry and malformed input are not
/// distinguished to callers; the message is for logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid token: {0}")]
pub struct InvalidToken(pub String);

impl From<jsonwebtoken::errors::Error> for InvalidToken {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        InvalidToken(err.to_string())
    }
}

/// Verifies tokens against one signing secret.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify `token` and return its claims.
    pub fn verify(&self, token: &str) -> Result<Value, InvalidToken> {
        let data = decode::<Value>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}
