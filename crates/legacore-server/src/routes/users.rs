use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Query, State};
use legacore_core::aggregate::ListEnvelope;
use legacore_core::error::require_fields;
use legacore_core::models::EnumField;
use legacore_core::models::user::{CreateUser, User, UserRole};
use legacore_core::query::{ListQuery, QueryParams, Scope, USER_QUERY};
use legacore_core::repository::UserRepository;
use serde::Deserialize;

use super::{Created, created, parse_id, present};
use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub company_id: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub active: Option<bool>,
}

/// Users across all companies; narrow with `companyId` and `role`.
pub async fn list(
    State(state): State<AppState>,
    Query(raw): Query<BTreeMap<String, String>>,
) -> ApiResult<Json<ListEnvelope<User>>> {
    let params = QueryParams::from(raw);
    let page = state
        .users
        .list(ListQuery::build(&USER_QUERY, &params, Scope::Global))
        .await?;
    Ok(Json(ListEnvelope::from_page(page)))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateUserRequest>,
) -> ApiResult<Created<User>> {
    require_fields(&[
        ("email", present(&body.email)),
        ("password", present(&body.password)),
        ("companyId", present(&body.company_id)),
    ])?;

    let company_id = parse_id("companyId", body.company_id.as_deref().unwrap_or_default())?;
    let role = match body.role.as_deref() {
        Some(raw) => UserRole::parse(raw)?,
        None => UserRole::User,
    };

    let user = state
        .users
        .create(CreateUser {
            company_id,
            email: body.email.unwrap_or_default(),
            name: body.name,
            password: body.password.unwrap_or_default(),
            role,
            active: body.active.unwrap_or(true),
        })
        .await?;
    Ok(created(user))
}
