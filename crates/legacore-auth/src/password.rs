//! Password hashing and verification using Argon2id.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::config::CredentialConfig;
use crate::error::AuthError;

/// Output of [`hash_password`]. `hash` is the PHC string (which embeds the
/// salt); `salt` is stored alongside it in its own column.
#[derive(Debug, Clone)]
pub struct PasswordDigest {
    pub hash: String,
    pub salt: String,
}

fn argon2() -> Result<Argon2<'static>, AuthError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| AuthError::Crypto(format!("argon2 params error: {e}")))?;
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

fn peppered(password: &str, pepper: Option<&str>) -> String {
    match pepper {
        Some(p) => format!("{p}{password}"),
        None => password.to_string(),
    }
}

/// Hash `password` with a fresh random salt, after enforcing the minimum
/// length from `config`.
pub fn hash_password(password: &str, config: &CredentialConfig) -> Result<PasswordDigest, AuthError> {
    if password.chars().count() < config.min_password_length {
        return Err(AuthError::PasswordTooShort {
            min: config.min_password_length,
        });
    }

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let input = peppered(password, config.pepper());
    let hash = argon2()?
        .hash_password(input.as_bytes(), &salt)
        .map_err(|e| AuthError::Crypto(format!("password hash error: {e}")))?;

    Ok(PasswordDigest {
        hash: hash.to_string(),
        salt: salt.as_str().to_string(),
    })
}

/// Verify a plaintext password against an Argon2id PHC-format hash.
///
/// The pepper must match the one used during hashing. Returns `Ok(false)`
/// on mismatch and `Err(AuthError::Crypto)` if the stored hash is
/// malformed.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    let input = peppered(password, pepper);
    match Argon2::default().verify_password(input.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pepper: Option<&str>) -> CredentialConfig {
        CredentialConfig {
            pepper: pepper.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn correct_password_matches() {
        let digest = hash_password("hunter22", &config(None)).unwrap();
        assert!(verify_password("hunter22", &digest.hash, None).unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        let digest = hash_password("hunter22", &config(None)).unwrap();
        assert!(!verify_password("wrong-one", &digest.hash, None).unwrap());
    }

    #[test]
    fn salt_is_embedded_and_unique() {
        let a = hash_password("hunter22", &config(None)).unwrap();
        let b = hash_password("hunter22", &config(None)).unwrap();
        assert!(a.hash.contains(&a.salt));
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn pepper_is_applied() {
        let digest = hash_password("hunter22", &config(Some("pepper!"))).unwrap();
        assert!(verify_password("hunter22", &digest.hash, Some("pepper!")).unwrap());
        assert!(!verify_password("hunter22", &digest.hash, None).unwrap());
    }

    #[test]
    fn short_password_is_rejected() {
        let err = hash_password("short", &config(None)).unwrap_err();
        assert!(matches!(err, AuthError::PasswordTooShort { min: 8 }));
    }

    #[test]
    fn malformed_hash_returns_error() {
        assert!(verify_password("pw", "not-a-hash", None).is_err());
    }
}
