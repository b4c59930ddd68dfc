//! Credential error types.

use legacore_core::error::LegacoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for LegacoreError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::PasswordTooShort { .. } => LegacoreError::validation(err.to_string()),
            AuthError::Crypto(msg) => LegacoreError::Internal(msg),
        }
    }
}
