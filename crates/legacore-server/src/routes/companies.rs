use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Query, State};
use futures::future::try_join_all;
use legacore_core::aggregate::ListEnvelope;
use legacore_core::error::{LegacoreError, require_fields};
use legacore_core::models::company::{Company, CompanyWithCounts, CreateCompany, validate_slug};
use legacore_core::query::{COMPANY_QUERY, ListQuery, QueryParams, Scope};
use legacore_core::repository::{CompanyRepository, PaginatedResult};
use serde::Deserialize;
use tracing::info;

use super::{Created, created, present};
use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub domain: Option<String>,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub active: Option<bool>,
}

/// Companies with their user, case and document counts.
pub async fn list(
    State(state): State<AppState>,
    Query(raw): Query<BTreeMap<String, String>>,
) -> ApiResult<Json<ListEnvelope<CompanyWithCounts>>> {
    let params = QueryParams::from(raw);
    let PaginatedResult { items, total, page } = state
        .companies
        .list(ListQuery::build(&COMPANY_QUERY, &params, Scope::Global))
        .await?;

    let companies = &state.companies;
    let items = try_join_all(items.into_iter().map(|company| async move {
        let counts = companies.counts(company.id).await?;
        Ok::<_, LegacoreError>(CompanyWithCounts { company, counts })
    }))
    .await?;

    Ok(Json(ListEnvelope::from_page(PaginatedResult {
        items,
        total,
        page,
    })))
}

/// Create a company together with its zero-balance credit account.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateCompanyRequest>,
) -> ApiResult<Created<Company>> {
    require_fields(&[("name", present(&body.name)), ("slug", present(&body.slug))])?;
    let slug = body.slug.unwrap_or_default();
    validate_slug(&slug)?;

    let company = state
        .companies
        .create(CreateCompany {
            name: body.name.unwrap_or_default(),
            slug,
            domain: body.domain,
            logo: body.logo,
            description: body.description,
            industry: body.industry,
            active: body.active.unwrap_or(true),
        })
        .await?;

    info!(company_id = %company.id, slug = %company.slug, "Company onboarded");
    Ok(created(company))
}
