//! Government contract opportunities. Global records, ranked by relevance.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Query, State};
use chrono::Utc;
use legacore_core::aggregate::{ListEnvelope, OpportunityStats, opportunity_stats};
use legacore_core::ai::{OPPORTUNITY_KEYWORDS, SUMMARY_MAX_LEN, score_relevance, summarize};
use legacore_core::error::require_fields;
use legacore_core::models::opportunity::{ContractOpportunity, CreateContractOpportunity};
use legacore_core::query::{ListQuery, OPPORTUNITY_QUERY, QueryParams, Scope};
use legacore_core::repository::OpportunityRepository;
use serde::Deserialize;

use super::{Created, created, parse_date, present};
use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOpportunityRequest {
    pub solicitation: Option<String>,
    pub title: Option<String>,
    pub agency: Option<String>,
    pub description: Option<String>,
    pub posted_date: Option<String>,
    pub response_deadline: Option<String>,
    pub set_value: Option<f64>,
    pub place_of_performance: Option<String>,
    pub naics_code: Option<String>,
    pub psc_code: Option<String>,
    pub contact_info: Option<String>,
    pub url: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(raw): Query<BTreeMap<String, String>>,
) -> ApiResult<Json<ListEnvelope<ContractOpportunity>>> {
    let params = QueryParams::from(raw);
    let page = state
        .opportunities
        .list(ListQuery::build(&OPPORTUNITY_QUERY, &params, Scope::Global))
        .await?;
    Ok(Json(ListEnvelope::from_page(page)))
}

/// The relevance score and summary are derived from the description.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateOpportunityRequest>,
) -> ApiResult<Created<ContractOpportunity>> {
    require_fields(&[
        ("solicitation", present(&body.solicitation)),
        ("title", present(&body.title)),
        ("agency", present(&body.agency)),
        ("postedDate", present(&body.posted_date)),
        ("responseDeadline", present(&body.response_deadline)),
    ])?;

    let posted_date = parse_date("postedDate", body.posted_date.as_deref().unwrap_or_default())?;
    let response_deadline = parse_date(
        "responseDeadline",
        body.response_deadline.as_deref().unwrap_or_default(),
    )?;
    let description = body.description.unwrap_or_default();
    let ai_score = score_relevance(&description, OPPORTUNITY_KEYWORDS);
    let ai_summary = (!description.is_empty()).then(|| summarize(&description, SUMMARY_MAX_LEN));

    let opportunity = state
        .opportunities
        .create(CreateContractOpportunity {
            solicitation: body.solicitation.unwrap_or_default(),
            title: body.title.unwrap_or_default(),
            agency: body.agency.unwrap_or_default(),
            description: (!description.is_empty()).then_some(description),
            posted_date,
            response_deadline,
            set_value: body.set_value,
            place_of_performance: body.place_of_performance,
            naics_code: body.naics_code,
            psc_code: body.psc_code,
            contact_info: body.contact_info,
            url: body.url,
            ai_score,
            ai_summary,
            metadata: body.metadata,
        })
        .await?;
    Ok(created(opportunity))
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<OpportunityStats>> {
    let opportunities = state.opportunities.all().await?;
    Ok(Json(opportunity_stats(&opportunities, Utc::now())))
}
