use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Query, State};
use chrono::Utc;
use legacore_core::aggregate::{ListEnvelope, MetricGroup, group_analytics};
use legacore_core::error::require_fields;
use legacore_core::models::analytics::{AnalyticsRecord, CreateAnalyticsRecord, current_period};
use legacore_core::query::{ANALYTICS_QUERY, ListQuery, QueryParams, Scope};
use legacore_core::repository::AnalyticsRepository;
use serde::Deserialize;

use super::{Created, created, present};
use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;
use crate::tenant::Tenant;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetricRequest {
    pub metric_name: Option<String>,
    pub metric_value: Option<f64>,
    pub period: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Analytics records plus per-metric series grouped over the returned page.
pub async fn list(
    State(state): State<AppState>,
    Tenant(company): Tenant,
    Query(raw): Query<BTreeMap<String, String>>,
) -> ApiResult<Json<ListEnvelope<AnalyticsRecord, Vec<MetricGroup>>>> {
    let params = QueryParams::from(raw);
    let page = state
        .analytics
        .list(ListQuery::build(&ANALYTICS_QUERY, &params, Scope::Tenant(company.id)))
        .await?;
    let aggregated = group_analytics(&page.items);
    Ok(Json(ListEnvelope::from_page(page).with_aggregated(aggregated)))
}

pub async fn create(
    State(state): State<AppState>,
    Tenant(company): Tenant,
    ApiJson(body): ApiJson<RecordMetricRequest>,
) -> ApiResult<Created<AnalyticsRecord>> {
    require_fields(&[
        ("metricName", present(&body.metric_name)),
        ("metricValue", body.metric_value.is_some()),
    ])?;

    let record = state
        .analytics
        .record(CreateAnalyticsRecord {
            company_id: company.id,
            metric_name: body.metric_name.unwrap_or_default(),
            metric_value: body.metric_value.unwrap_or_default(),
            period: body
                .period
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| current_period(Utc::now())),
            metadata: body.metadata,
        })
        .await?;
    Ok(created(record))
}
