//! Case domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EnumField, UserRef};
use crate::error::{LegacoreError, LegacoreResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    Open,
    InProgress,
    Pending,
    Closed,
    Archived,
}

impl EnumField for CaseStatus {
    const FIELD: &'static str = "status";
    const ALL: &'static [Self] = &[
        Self::Open,
        Self::InProgress,
        Self::Pending,
        Self::Closed,
        Self::Archived,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Pending => "PENDING",
            Self::Closed => "CLOSED",
            Self::Archived => "ARCHIVED",
        }
    }
}

pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 5;
pub const DEFAULT_PRIORITY: u8 = 3;

/// Reject priorities outside `[1, 5]`.
pub fn validate_priority(priority: i64) -> LegacoreResult<u8> {
    if (i64::from(MIN_PRIORITY)..=i64::from(MAX_PRIORITY)).contains(&priority) {
        Ok(priority as u8)
    } else {
        Err(LegacoreError::validation(format!(
            "Invalid priority. Must be between {MIN_PRIORITY} and {MAX_PRIORITY}"
        )))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: Uuid,
    pub company_id: Uuid,
    pub case_number: String,
    pub title: String,
    pub description: Option<String>,
    pub status: CaseStatus,
    pub priority: u8,
    pub amount: Option<f64>,
    pub currency: String,
    pub assigned_to_id: Option<Uuid>,
    /// Populated on list and create responses.
    pub assigned_to: Option<UserRef>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateCase {
    pub company_id: Uuid,
    pub case_number: String,
    pub title: String,
    pub description: Option<String>,
    pub status: CaseStatus,
    pub priority: u8,
    pub amount: Option<f64>,
    pub currency: String,
    pub assigned_to_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

/// In-place update. Any status transition is permitted.
#[derive(Debug, Clone, Default)]
pub struct UpdateCase {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<CaseStatus>,
    pub priority: Option<u8>,
    pub amount: Option<f64>,
    /// `Some(Some(id))` = assign, `Some(None)` = unassign, `None` = no change.
    pub assigned_to_id: Option<Option<Uuid>>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Build a case number from the tenant slug: first three characters
/// upper-cased, the creation time in unix millis and a random suffix
/// below 1000.
pub fn case_number(slug: &str, now: DateTime<Utc>, suffix: u16) -> String {
    let prefix: String = slug.chars().take(3).collect::<String>().to_uppercase();
    format!("{prefix}-{}-{}", now.timestamp_millis(), suffix % 1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_number_uses_slug_prefix() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(
            case_number("hbu-asset-recovery", now, 42),
            "HBU-1700000000123-42"
        );
        assert_eq!(case_number("ab", now, 1999), "AB-1700000000123-999");
    }

    #[test]
    fn priority_bounds() {
        assert_eq!(validate_priority(1).unwrap(), 1);
        assert_eq!(validate_priority(5).unwrap(), 5);
        assert!(validate_priority(0).is_err());
        assert!(validate_priority(6).is_err());
    }

    #[test]
    fn status_round_trips_through_wire_name() {
        for status in CaseStatus::ALL {
            assert_eq!(CaseStatus::parse(status.as_str()).unwrap(), *status);
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.as_str());
        }
    }
}
