//! HTTP handlers, grouped by resource.
//!
//! Global admin resources live under `/api`; tenant resources are mounted
//! both under `/api` (configured tenant) and `/api/tenants/{tenant}`.

pub mod ai;
pub mod analytics;
pub mod assets;
pub mod cases;
pub mod companies;
pub mod credits;
pub mod health;
pub mod opportunities;
pub mod projects;
pub mod users;

use axum::Json;
use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, Utc};
use legacore_core::error::{LegacoreError, LegacoreResult};
use uuid::Uuid;

pub(crate) const DEFAULT_CURRENCY: &str = "USD";

/// A created record, answered with 201.
pub type Created<T> = (StatusCode, Json<T>);

pub fn created<T>(value: T) -> Created<T> {
    (StatusCode::CREATED, Json(value))
}

/// A required text field counts as present only when non-empty.
pub(crate) fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

pub(crate) fn parse_id(field: &str, raw: &str) -> LegacoreResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| LegacoreError::validation(format!("Invalid {field}")))
}

/// Absent and empty both mean "no reference".
pub(crate) fn parse_opt_id(field: &str, raw: Option<&str>) -> LegacoreResult<Option<Uuid>> {
    match raw.filter(|v| !v.is_empty()) {
        Some(v) => parse_id(field, v).map(Some),
        None => Ok(None),
    }
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
pub(crate) fn parse_date(field: &str, raw: &str) -> LegacoreResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| LegacoreError::validation(format!("Invalid {field}")))
}

pub(crate) fn parse_opt_date(field: &str, raw: Option<&str>) -> LegacoreResult<Option<DateTime<Utc>>> {
    raw.filter(|v| !v.is_empty())
        .map(|v| parse_date(field, v))
        .transpose()
}
