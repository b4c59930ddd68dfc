//! Analytics record domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRecord {
    pub id: Uuid,
    pub company_id: Uuid,
    pub metric_name: String,
    pub metric_value: f64,
    /// Reporting period label, e.g. `2024-01` or `2024-Q1`.
    pub period: String,
    pub metadata: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateAnalyticsRecord {
    pub company_id: Uuid,
    pub metric_name: String,
    pub metric_value: f64,
    pub period: String,
    pub metadata: Option<serde_json::Value>,
}

/// Default reporting period: the current calendar month as `YYYY-MM`.
pub fn current_period(now: DateTime<Utc>) -> String {
    now.format("%Y-%m").to_string()
}
