//! Company (tenant) domain model.
//!
//! Companies provide full data isolation. Users, cases, documents,
//! projects, analytics and the credit account are all scoped to one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LegacoreError, LegacoreResult};

/// A company is an isolated customer scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    /// Unique display name.
    pub name: String,
    /// URL-safe unique identifier (e.g., `hbu-asset-recovery`). Immutable.
    pub slug: String,
    pub domain: Option<String>,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    /// Inactive companies do not resolve as tenants.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompany {
    pub name: String,
    pub slug: String,
    pub domain: Option<String>,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub active: bool,
}

/// Number of records a company owns, shown in the admin listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyCounts {
    pub users: u64,
    pub cases: u64,
    pub documents: u64,
}

/// A company together with its record counts.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyWithCounts {
    #[serde(flatten)]
    pub company: Company,
    #[serde(rename = "_count")]
    pub counts: CompanyCounts,
}

/// Slugs are lowercase ASCII letters, digits and single inner hyphens.
pub fn validate_slug(slug: &str) -> LegacoreResult<()> {
    let well_formed = !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if well_formed {
        Ok(())
    } else {
        Err(LegacoreError::validation(
            "Invalid slug. Use lowercase letters, digits and hyphens",
        ))
    }
}
