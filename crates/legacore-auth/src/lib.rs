//! Legacore Auth: credential hashing and verification (Argon2id).

pub mod config;
pub mod error;
pub mod password;

pub use config::CredentialConfig;
pub use error::AuthError;
pub use password::{PasswordDigest, hash_password, verify_password};
