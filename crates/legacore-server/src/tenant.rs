//! Request-scoped tenant extraction.
//!
//! Routes nested under `/api/tenants/{tenant}` take the slug from the
//! path; the unprefixed tenant routes use the configured `tenant_slug`.
//! Resolution happens before the handler body runs, so an unknown or
//! inactive tenant never reaches a repository.

use std::collections::HashMap;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use legacore_core::models::company::Company;
use legacore_core::tenant::resolve_tenant;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

const TENANT_PARAM: &str = "tenant";

/// The resolved, active company a request operates on.
#[derive(Debug, Clone)]
pub struct Tenant(pub Company);

impl FromRequestParts<AppState> for Tenant {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let from_path = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .ok()
            .and_then(|Path(mut params)| params.remove(TENANT_PARAM));

        let slug = from_path.unwrap_or_else(|| state.config.tenant_slug.clone());
        let company = resolve_tenant(&state.companies, &slug).await?;
        debug!(tenant = %company.slug, company_id = %company.id, "tenant resolved");
        Ok(Self(company))
    }
}
