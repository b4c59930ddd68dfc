use std::collections::{BTreeMap, HashMap};

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::Utc;
use legacore_core::aggregate::{CaseStats, ListEnvelope, case_stats};
use legacore_core::error::{LegacoreError, require_fields};
use legacore_core::models::EnumField;
use legacore_core::models::case::{
    Case, CaseStatus, CreateCase, DEFAULT_PRIORITY, UpdateCase, case_number, validate_priority,
};
use legacore_core::query::{CASE_QUERY, ListQuery, QueryParams, Scope};
use legacore_core::repository::CaseRepository;
use rand::Rng;
use serde::{Deserialize, Deserializer};

use super::{Created, DEFAULT_CURRENCY, created, parse_id, parse_opt_date, parse_opt_id, present};
use crate::error::{ApiJson, ApiError, ApiResult};
use crate::state::AppState;
use crate::tenant::Tenant;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<i64>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub assigned_to_id: Option<String>,
    pub due_date: Option<String>,
}

/// Partial update. `assignedToId: null` clears the assignee; omitting the
/// field leaves it unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCaseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<i64>,
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to_id: Option<Option<String>>,
    pub due_date: Option<String>,
}

fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

pub async fn list(
    State(state): State<AppState>,
    Tenant(company): Tenant,
    Query(raw): Query<BTreeMap<String, String>>,
) -> ApiResult<Json<ListEnvelope<Case>>> {
    let params = QueryParams::from(raw);
    let page = state
        .cases
        .list(ListQuery::build(&CASE_QUERY, &params, Scope::Tenant(company.id)))
        .await?;
    Ok(Json(ListEnvelope::from_page(page)))
}

pub async fn create(
    State(state): State<AppState>,
    Tenant(company): Tenant,
    ApiJson(body): ApiJson<CreateCaseRequest>,
) -> ApiResult<Created<Case>> {
    require_fields(&[("title", present(&body.title))])?;

    let status = match body.status.as_deref() {
        Some(raw) => CaseStatus::parse(raw)?,
        None => CaseStatus::Open,
    };
    let priority = match body.priority {
        Some(raw) => validate_priority(raw)?,
        None => DEFAULT_PRIORITY,
    };
    let suffix = rand::thread_rng().gen_range(0..1000u16);

    let case = state
        .cases
        .create(CreateCase {
            company_id: company.id,
            case_number: case_number(&company.slug, Utc::now(), suffix),
            title: body.title.unwrap_or_default(),
            description: body.description,
            status,
            priority,
            amount: body.amount,
            currency: body.currency.unwrap_or_else(|| DEFAULT_CURRENCY.into()),
            assigned_to_id: parse_opt_id("assignedToId", body.assigned_to_id.as_deref())?,
            due_date: parse_opt_date("dueDate", body.due_date.as_deref())?,
        })
        .await?;
    Ok(created(case))
}

pub async fn update(
    State(state): State<AppState>,
    Tenant(company): Tenant,
    Path(path): Path<HashMap<String, String>>,
    ApiJson(body): ApiJson<UpdateCaseRequest>,
) -> ApiResult<Json<Case>> {
    let raw_id = path
        .get("id")
        .ok_or_else(|| ApiError(LegacoreError::validation("Missing case id")))?;
    let id = parse_id("case id", raw_id)?;

    let assigned_to_id = match body.assigned_to_id {
        Some(raw) => Some(parse_opt_id("assignedToId", raw.as_deref())?),
        None => None,
    };

    let case = state
        .cases
        .update(
            company.id,
            id,
            UpdateCase {
                title: body.title,
                description: body.description,
                status: body.status.as_deref().map(CaseStatus::parse).transpose()?,
                priority: body.priority.map(validate_priority).transpose()?,
                amount: body.amount,
                assigned_to_id,
                due_date: parse_opt_date("dueDate", body.due_date.as_deref())?,
            },
        )
        .await?;
    Ok(Json(case))
}

/// Status breakdown over every case of the tenant.
pub async fn stats(
    State(state): State<AppState>,
    Tenant(company): Tenant,
) -> ApiResult<Json<CaseStats>> {
    let cases = state.cases.all(company.id).await?;
    Ok(Json(case_stats(&cases)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_assignee_differs_from_omitted() {
        let cleared: UpdateCaseRequest =
            serde_json::from_str(r#"{"assignedToId": null}"#).unwrap();
        assert_eq!(cleared.assigned_to_id, Some(None));

        let untouched: UpdateCaseRequest = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(untouched.assigned_to_id, None);
    }
}
