//! Error types for the Legacore platform.
//!
//! Every variant maps to exactly one HTTP status class and a stable kind
//! identifier. Operational errors (validation, not found, conflict, ...)
//! are client-correctable; the rest are internal faults whose detail must
//! not reach the client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LegacoreError {
    #[error("{message}")]
    Validation { message: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("{entity} not found")]
    NotFound { entity: String, id: String },

    #[error("{entity} already exists")]
    AlreadyExists { entity: String },

    #[error("Too many requests")]
    RateLimited,

    #[error("Database error: {0}")]
    Database(String),

    #[error("External service {service} failed: {message}")]
    ExternalService { service: String, message: String },

    #[error("Tenant context missing or invalid")]
    TenantContext,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type LegacoreResult<T> = Result<T, LegacoreError>;

impl LegacoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn already_exists(entity: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity: entity.into(),
        }
    }

    /// Numeric status class for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::AuthenticationFailed { .. } => 401,
            Self::AuthorizationDenied { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::AlreadyExists { .. } => 409,
            Self::RateLimited => 429,
            Self::Database(_) | Self::TenantContext | Self::Internal(_) => 500,
            Self::ExternalService { .. } => 503,
        }
    }

    /// Stable kind identifier rendered as `code` in error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "ValidationError",
            Self::AuthenticationFailed { .. } => "AuthenticationError",
            Self::AuthorizationDenied { .. } => "AuthorizationError",
            Self::NotFound { .. } => "NotFoundError",
            Self::AlreadyExists { .. } => "ConflictError",
            Self::RateLimited => "RateLimitError",
            Self::Database(_) => "DatabaseError",
            Self::ExternalService { .. } => "ExternalServiceError",
            Self::TenantContext | Self::Internal(_) => "InternalError",
        }
    }

    /// Whether the error is an expected, client-correctable condition.
    ///
    /// Non-operational errors are rendered with a generic message.
    pub fn is_operational(&self) -> bool {
        !matches!(
            self,
            Self::Database(_)
                | Self::ExternalService { .. }
                | Self::TenantContext
                | Self::Internal(_)
        )
    }
}

/// Fail with a validation error naming every field in `fields` whose
/// `present` flag is false.
pub fn require_fields(fields: &[(&str, bool)]) -> LegacoreResult<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(LegacoreError::validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(LegacoreError::validation("x").status_code(), 400);
        assert_eq!(
            LegacoreError::AuthenticationFailed { reason: "x".into() }.status_code(),
            401
        );
        assert_eq!(
            LegacoreError::AuthorizationDenied { reason: "x".into() }.status_code(),
            403
        );
        assert_eq!(LegacoreError::not_found("Company", "acme").status_code(), 404);
        assert_eq!(LegacoreError::already_exists("Company").status_code(), 409);
        assert_eq!(LegacoreError::RateLimited.status_code(), 429);
        assert_eq!(LegacoreError::Database("boom".into()).status_code(), 500);
        assert_eq!(
            LegacoreError::ExternalService {
                service: "ai".into(),
                message: "down".into()
            }
            .status_code(),
            503
        );
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = LegacoreError::not_found("Company", "missing");
        assert_eq!(err.to_string(), "Company not found");
        assert_eq!(err.kind(), "NotFoundError");
    }

    #[test]
    fn database_errors_are_not_operational() {
        assert!(!LegacoreError::Database("x".into()).is_operational());
        assert!(LegacoreError::validation("x").is_operational());
        assert!(LegacoreError::already_exists("User").is_operational());
    }

    #[test]
    fn require_fields_lists_all_missing() {
        let err = require_fields(&[("name", false), ("slug", false), ("domain", true)])
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: name, slug");
        assert!(require_fields(&[("name", true)]).is_ok());
    }
}
