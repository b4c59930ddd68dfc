//! Government contract opportunity domain model.
//!
//! Opportunities are global records shared by every tenant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractOpportunity {
    pub id: Uuid,
    /// Unique solicitation number (e.g., `W911QY24R0001`).
    pub solicitation: String,
    pub title: String,
    pub agency: String,
    pub description: Option<String>,
    pub posted_date: DateTime<Utc>,
    pub response_deadline: DateTime<Utc>,
    pub set_value: Option<f64>,
    pub place_of_performance: Option<String>,
    pub naics_code: Option<String>,
    pub psc_code: Option<String>,
    pub contact_info: Option<String>,
    pub url: Option<String>,
    /// Relevance score in `[0, 100]`.
    pub ai_score: f64,
    pub ai_summary: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateContractOpportunity {
    pub solicitation: String,
    pub title: String,
    pub agency: String,
    pub description: Option<String>,
    pub posted_date: DateTime<Utc>,
    pub response_deadline: DateTime<Utc>,
    pub set_value: Option<f64>,
    pub place_of_performance: Option<String>,
    pub naics_code: Option<String>,
    pub psc_code: Option<String>,
    pub contact_info: Option<String>,
    pub url: Option<String>,
    pub ai_score: f64,
    pub ai_summary: Option<String>,
    pub metadata: Option<serde_json::Value>,
}
