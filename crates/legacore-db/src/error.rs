//! Database-specific error types and conversions.

use legacore_core::error::LegacoreError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("{entity} already exists")]
    Conflict { entity: String },

    /// A business rule enforced inside a transaction (`THROW`) failed.
    #[error("{0}")]
    Rejected(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Prefix carried by `THROW` messages that represent a client error.
pub(crate) const REJECT_PREFIX: &str = "rejected: ";

impl DbError {
    /// Classify the error returned by `Response::check()`.
    ///
    /// Unique-index violations become [`DbError::Conflict`] for `entity`;
    /// `THROW`n rule failures become [`DbError::Rejected`]. Anything else
    /// stays a [`DbError::Surreal`] query failure.
    pub(crate) fn from_check(err: surrealdb::Error, entity: &str) -> Self {
        let message = err.to_string();
        if message.contains("already contains") {
            return Self::Conflict {
                entity: entity.into(),
            };
        }
        if let Some(pos) = message.find(REJECT_PREFIX) {
            let reason = message[pos + REJECT_PREFIX.len()..]
                .trim_end_matches(['\'', '"', '`'])
                .to_string();
            return Self::Rejected(reason);
        }
        Self::Surreal(err)
    }
}

impl From<DbError> for LegacoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => LegacoreError::NotFound { entity, id },
            DbError::Conflict { entity } => LegacoreError::AlreadyExists { entity },
            DbError::Rejected(message) => LegacoreError::Validation { message },
            other => LegacoreError::Database(other.to_string()),
        }
    }
}

pub(crate) fn parse_uuid(value: &str, what: &str) -> Result<uuid::Uuid, DbError> {
    uuid::Uuid::parse_str(value).map_err(|e| DbError::Corrupt(format!("invalid {what} UUID: {e}")))
}

pub(crate) fn parse_opt_uuid(value: Option<String>, what: &str) -> Result<Option<uuid::Uuid>, DbError> {
    value.as_deref().map(|v| parse_uuid(v, what)).transpose()
}
