//! Domain models for Legacore.
//!
//! Every business record except contract opportunities belongs to exactly
//! one company (the tenant). Wire names are camelCase; closed enum sets are
//! SCREAMING_SNAKE_CASE.

pub mod analytics;
pub mod case;
pub mod company;
pub mod credit;
pub mod document;
pub mod opportunity;
pub mod project;
pub mod user;

use crate::error::{LegacoreError, LegacoreResult};

/// A closed set of string values stored and transmitted verbatim.
pub trait EnumField: Sized + Copy + 'static {
    /// Field name used in validation messages.
    const FIELD: &'static str;
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn parse(value: &str) -> LegacoreResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == value)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                LegacoreError::validation(format!(
                    "Invalid {}. Must be one of: {}",
                    Self::FIELD,
                    allowed.join(", ")
                ))
            })
    }
}

/// Lightweight reference to a user, embedded in case and document
/// responses in place of the full record.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: uuid::Uuid,
    pub name: Option<String>,
    pub email: String,
}
