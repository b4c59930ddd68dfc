use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Query, State};
use chrono::Utc;
use legacore_core::aggregate::{ListEnvelope, ProjectStats, project_stats};
use legacore_core::error::require_fields;
use legacore_core::models::project::{CreateProject, DEFAULT_PROJECT_STATUS, Project};
use legacore_core::query::{ListQuery, PROJECT_QUERY, QueryParams, Scope};
use legacore_core::repository::ProjectRepository;
use serde::Deserialize;

use super::{Created, DEFAULT_CURRENCY, created, parse_opt_date, present};
use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;
use crate::tenant::Tenant;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub budget: Option<f64>,
    pub currency: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

pub async fn list(
    State(state): State<AppState>,
    Tenant(company): Tenant,
    Query(raw): Query<BTreeMap<String, String>>,
) -> ApiResult<Json<ListEnvelope<Project>>> {
    let params = QueryParams::from(raw);
    let page = state
        .projects
        .list(ListQuery::build(&PROJECT_QUERY, &params, Scope::Tenant(company.id)))
        .await?;
    Ok(Json(ListEnvelope::from_page(page)))
}

pub async fn create(
    State(state): State<AppState>,
    Tenant(company): Tenant,
    ApiJson(body): ApiJson<CreateProjectRequest>,
) -> ApiResult<Created<Project>> {
    require_fields(&[("name", present(&body.name))])?;

    let start_date =
        parse_opt_date("startDate", body.start_date.as_deref())?.unwrap_or_else(Utc::now);
    let project = state
        .projects
        .create(CreateProject {
            company_id: company.id,
            name: body.name.unwrap_or_default(),
            description: body.description,
            status: body
                .status
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_PROJECT_STATUS.into()),
            budget: body.budget,
            currency: body.currency.unwrap_or_else(|| DEFAULT_CURRENCY.into()),
            start_date,
            end_date: parse_opt_date("endDate", body.end_date.as_deref())?,
            metadata: body.metadata,
        })
        .await?;
    Ok(created(project))
}

pub async fn stats(
    State(state): State<AppState>,
    Tenant(company): Tenant,
) -> ApiResult<Json<ProjectStats>> {
    let projects = state.projects.all(company.id).await?;
    Ok(Json(project_stats(&projects)))
}
