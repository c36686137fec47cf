//! Credential verification for protected paths.
//!
//! # Flow
//! ```text
//! auth disabled             → Ok(None)
//! no signing secret         → Err(MissingSigningSecret)      (500)
//! header → query → cookie   → first verified token wins      Ok(Some(claims))
//! nothing verified          → Err(Missing/InvalidCredential) (401)
//! ```
//!
//! A source that is present but fails verification is logged and the next
//! source is tried.

use axum::http::{HeaderMap, Uri};
use serde_json::Value;

use crate::auth::error::AuthError;
use crate::auth::sources::CredentialSource;
use crate::auth::token::TokenVerifier;
use crate::config::AuthConfig;

#[derive(Debug)]
pub struct CredentialVerifier {
    enabled: bool,
    cookie_name: String,
    tokens: Option<TokenVerifier>,
}

impl CredentialVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            enabled: config.enabled,
            cookie_name: config.cookie_name.clone(),
            tokens: config
                .secret
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(TokenVerifier::new),
        }
    }

    /// Authenticate a request, returning its claims.
    ///
    /// `Ok(None)` only when authentication is disabled.
    pub fn authenticate(&self, uri: &Uri, headers: &HeaderMap) -> Result<Option<Value>, AuthError> {
        if !self.enabled {
            return Ok(None);
        }

        let Some(tokens) = &self.tokens else {
            tracing::error!("Signing secret is not configured");
            return Err(AuthError::MissingSigningSecret);
        };

        let mut presented = false;
        for source in CredentialSource::ORDER {
            let Some(token) = source.extract(uri, headers, &self.cookie_name) else {
                continue;
            };
            presented = true;

            match tokens.verify(&token) {
                Ok(claims) => {
                    tracing::debug!(source = %source, "Credential verified");
                    return Ok(Some(claims));
                }
                Err(e) => {
                    tracing::warn!(source = %source, error = %e, "Token verification failed");
                }
            }
        }

        if presented {
            Err(AuthError::InvalidCredential)
        } else {
            Err(AuthError::MissingCredential)
        }
    }
}
