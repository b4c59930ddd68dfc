//! Result aggregation: pagination envelopes, grouped metric series and
//! dashboard summaries.
//!
//! Everything here is a pure transformation of records already fetched
//! for one tenant.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::EnumField;
use crate::models::analytics::AnalyticsRecord;
use crate::models::case::{Case, CaseStatus};
use crate::models::document::Document;
use crate::models::opportunity::ContractOpportunity;
use crate::models::project::Project;
use crate::repository::PaginatedResult;

/// `ceil(total / limit)`; zero exactly when `total` is zero.
pub fn page_count(total: u64, limit: u64) -> u64 {
    total.div_ceil(limit.max(1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

/// Standard list response: `{ data, pagination, aggregated? }`.
#[derive(Debug, Clone, Serialize)]
pub struct ListEnvelope<T, A = ()> {
    pub data: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregated: Option<A>,
    pub pagination: PaginationMeta,
}

impl<T> ListEnvelope<T> {
    pub fn from_page(result: PaginatedResult<T>) -> Self {
        let pagination = PaginationMeta {
            total: result.total,
            page: result.page.page,
            limit: result.page.limit,
            pages: page_count(result.total, result.page.limit),
        };
        Self {
            data: result.items,
            aggregated: None,
            pagination,
        }
    }

    pub fn with_aggregated<A>(self, aggregated: A) -> ListEnvelope<T, A> {
        ListEnvelope {
            data: self.data,
            aggregated: Some(aggregated),
            pagination: self.pagination,
        }
    }
}

// ---------------------------------------------------------------------------
// Grouped metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodValue {
    pub period: String,
    pub value: f64,
}

/// One named series with its sum and mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricGroup {
    pub name: String,
    pub values: Vec<PeriodValue>,
    pub total: f64,
    pub avg: f64,
}

/// Group `(name, period, value)` triples by name, keeping the order in
/// which each name first appears. Groups without values are omitted.
pub fn group_series<'a, I>(records: I) -> Vec<MetricGroup>
where
    I: IntoIterator<Item = (&'a str, &'a str, f64)>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<PeriodValue>, f64)> = Vec::new();

    for (name, period, value) in records {
        let slot = *index.entry(name).or_insert_with(|| {
            groups.push((name.to_string(), Vec::new(), 0.0));
            groups.len() - 1
        });
        let (_, values, total) = &mut groups[slot];
        values.push(PeriodValue {
            period: period.to_string(),
            value,
        });
        *total += value;
    }

    groups
        .into_iter()
        .filter(|(_, values, _)| !values.is_empty())
        .map(|(name, values, total)| MetricGroup {
            avg: total / values.len() as f64,
            name,
            values,
            total,
        })
        .collect()
}

pub fn group_analytics(records: &[AnalyticsRecord]) -> Vec<MetricGroup> {
    group_series(
        records
            .iter()
            .map(|r| (r.metric_name.as_str(), r.period.as_str(), r.metric_value)),
    )
}

// ---------------------------------------------------------------------------
// Dashboard summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStats {
    pub total: u64,
    pub open: u64,
    pub in_progress: u64,
    pub pending: u64,
    pub closed: u64,
    pub archived: u64,
    pub total_amount: f64,
}

pub fn case_stats(cases: &[Case]) -> CaseStats {
    cases.iter().fold(CaseStats::default(), |mut acc, c| {
        acc.total += 1;
        match c.status {
            CaseStatus::Open => acc.open += 1,
            CaseStatus::InProgress => acc.in_progress += 1,
            CaseStatus::Pending => acc.pending += 1,
            CaseStatus::Closed => acc.closed += 1,
            CaseStatus::Archived => acc.archived += 1,
        }
        acc.total_amount += c.amount.unwrap_or(0.0);
        acc
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub total: u64,
    pub by_type: BTreeMap<&'static str, u64>,
    pub total_size: u64,
}

pub fn document_stats(documents: &[Document]) -> DocumentStats {
    documents
        .iter()
        .fold(DocumentStats::default(), |mut acc, d| {
            acc.total += 1;
            *acc.by_type.entry(d.doc_type.as_str()).or_default() += 1;
            acc.total_size += d.filesize;
            acc
        })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total: u64,
    pub active: u64,
    pub completed: u64,
    pub total_budget: f64,
}

pub fn project_stats(projects: &[Project]) -> ProjectStats {
    projects.iter().fold(ProjectStats::default(), |mut acc, p| {
        acc.total += 1;
        match p.status.as_str() {
            "active" => acc.active += 1,
            "completed" => acc.completed += 1,
            _ => {}
        }
        acc.total_budget += p.budget.unwrap_or(0.0);
        acc
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityStats {
    pub total: u64,
    /// Deadline within the next 30 days and not yet passed.
    pub closing_soon: u64,
    pub avg_score: f64,
}

pub const CLOSING_SOON_DAYS: i64 = 30;

pub fn opportunity_stats(opportunities: &[ContractOpportunity], now: DateTime<Utc>) -> OpportunityStats {
    let horizon = now + Duration::days(CLOSING_SOON_DAYS);
    let total = opportunities.len() as u64;
    let closing_soon = opportunities
        .iter()
        .filter(|o| o.response_deadline >= now && o.response_deadline < horizon)
        .count() as u64;
    let avg_score = if total == 0 {
        0.0
    } else {
        opportunities.iter().map(|o| o.ai_score).sum::<f64>() / total as f64
    };
    OpportunityStats {
        total,
        closing_soon,
        avg_score,
    }
}
