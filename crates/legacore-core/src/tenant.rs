//! Tenant resolution: slug -> company.
//!
//! Resolution fails closed. An unknown slug and an inactive company both
//! surface as `NotFound`, and callers must not touch any other data before
//! resolution succeeds.

use tracing::debug;

use crate::error::{LegacoreError, LegacoreResult};
use crate::models::company::Company;
use crate::repository::CompanyRepository;

pub async fn resolve_tenant<R: CompanyRepository>(repo: &R, slug: &str) -> LegacoreResult<Company> {
    let company = match repo.get_by_slug(slug).await {
        Ok(company) => company,
        Err(LegacoreError::NotFound { .. }) => {
            return Err(LegacoreError::not_found("Company", slug));
        }
        Err(other) => return Err(other),
    };

    if !company.active {
        debug!(slug, "tenant is inactive");
        return Err(LegacoreError::not_found("Company", slug));
    }

    Ok(company)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::company::{CompanyCounts, CreateCompany};
    use crate::query::ListQuery;
    use crate::repository::PaginatedResult;

    /// Read-only stub keyed by slug.
    struct Companies(HashMap<String, Company>);

    fn company(slug: &str, active: bool) -> Company {
        Company {
            id: Uuid::new_v4(),
            name: slug.to_uppercase(),
            slug: slug.into(),
            domain: None,
            logo: None,
            description: None,
            industry: None,
            active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    impl CompanyRepository for Companies {
        async fn create(&self, _input: CreateCompany) -> LegacoreResult<Company> {
            unimplemented!()
        }
        async fn get_by_id(&self, _id: Uuid) -> LegacoreResult<Company> {
            unimplemented!()
        }
        async fn get_by_slug(&self, slug: &str) -> LegacoreResult<Company> {
            self.0
                .get(slug)
                .cloned()
                .ok_or_else(|| LegacoreError::not_found("company", slug))
        }
        async fn list(&self, _query: ListQuery) -> LegacoreResult<PaginatedResult<Company>> {
            unimplemented!()
        }
        async fn counts(&self, _id: Uuid) -> LegacoreResult<CompanyCounts> {
            unimplemented!()
        }
    }

    fn repo() -> Companies {
        Companies(
            [company("acme", true), company("dormant", false)]
                .into_iter()
                .map(|c| (c.slug.clone(), c))
                .collect(),
        )
    }

    #[tokio::test]
    async fn resolves_active_company() {
        let company = resolve_tenant(&repo(), "acme").await.unwrap();
        assert_eq!(company.slug, "acme");
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let err = resolve_tenant(&repo(), "nope").await.unwrap_err();
        assert!(matches!(err, LegacoreError::NotFound { .. }));
        assert_eq!(err.to_string(), "Company not found");
    }

    #[tokio::test]
    async fn inactive_company_does_not_resolve() {
        let err = resolve_tenant(&repo(), "dormant").await.unwrap_err();
        assert!(matches!(err, LegacoreError::NotFound { .. }));
    }
}
