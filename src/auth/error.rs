use thiserror::Error;

use crate::error::{ConfigurationError, GatewayError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("auth is enabled but no signing secret is configured")]
    MissingSigningSecret,

    #[error("no credential presented")]
    MissingCredential,

    #[error("no presented credential could be verified")]
    InvalidCredential,
}

impl AuthError {
    /// Label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingSigningSecret => "missing_secret",
            AuthError::MissingCredential => "missing",
            AuthError::InvalidCredential => "invalid",
        }
    }
}

impl From<AuthError> for GatewayError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingSigningSecret => {
                GatewayError::Configuration(ConfigurationError::MissingSigningSecret)
            }
            AuthError::MissingCredential | AuthError::InvalidCredential => {
                GatewayError::Unauthenticated
            }
        }
    }
}
