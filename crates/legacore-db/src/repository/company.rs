//! SurrealDB implementation of [`CompanyRepository`].
//!
//! A company and its zero-balance credit account are created in one
//! transaction, so every stored company has exactly one account.

use chrono::{DateTime, Utc};
use legacore_core::error::{LegacoreError, LegacoreResult};
use legacore_core::models::company::{Company, CompanyCounts, CreateCompany};
use legacore_core::query::ListQuery;
use legacore_core::repository::{CompanyRepository, PaginatedResult};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};
use crate::filter::{count_for_tenant, fetch_page};

const ENTITY: &str = "Company";

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct CompanyRow {
    name: String,
    slug: String,
    domain: Option<String>,
    logo: Option<String>,
    description: Option<String>,
    industry: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CompanyRow {
    fn into_company(self, id: Uuid) -> Company {
        Company {
            id,
            name: self.name,
            slug: self.slug,
            domain: self.domain,
            logo: self.logo,
            description: self.description,
            industry: self.industry,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct CompanyRowWithId {
    record_id: String,
    name: String,
    slug: String,
    domain: Option<String>,
    logo: Option<String>,
    description: Option<String>,
    industry: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CompanyRowWithId {
    fn try_into_company(self) -> Result<Company, DbError> {
        let id = parse_uuid(&self.record_id, "company")?;
        Ok(CompanyRow {
            name: self.name,
            slug: self.slug,
            domain: self.domain,
            logo: self.logo,
            description: self.description,
            industry: self.industry,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_company(id))
    }
}

#[derive(Debug, SurrealValue)]
struct ExistsRow {
    #[allow(dead_code)]
    record_id: String,
}

/// SurrealDB implementation of the Company repository.
#[derive(Clone)]
pub struct SurrealCompanyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCompanyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn taken(&self, slug: &str, name: &str) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id FROM company \
                 WHERE slug = $slug OR name = $name LIMIT 1",
            )
            .bind(("slug", slug.to_string()))
            .bind(("name", name.to_string()))
            .await?;
        let rows: Vec<ExistsRow> = result.take(0)?;
        Ok(!rows.is_empty())
    }
}

impl<C: Connection> CompanyRepository for SurrealCompanyRepository<C> {
    async fn create(&self, input: CreateCompany) -> LegacoreResult<Company> {
        if self.taken(&input.slug, &input.name).await? {
            return Err(LegacoreError::already_exists(ENTITY));
        }

        let id = Uuid::new_v4();

        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 CREATE type::record('company', $id) SET \
                     name = $name, slug = $slug, domain = $domain, \
                     logo = $logo, description = $description, \
                     industry = $industry, active = $active; \
                 CREATE type::record('credit', $credit_id) SET \
                     company_id = $id, balance = 0, \
                     total_purchased = 0, total_used = 0; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .bind(("credit_id", Uuid::new_v4().to_string()))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .bind(("domain", input.domain))
            .bind(("logo", input.logo))
            .bind(("description", input.description))
            .bind(("industry", input.industry))
            .bind(("active", input.active))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::from_check(e, ENTITY))?;

        let company = self.get_by_id(id).await?;
        info!(company_id = %company.id, slug = %company.slug, "Company created with credit account");
        Ok(company)
    }

    async fn get_by_id(&self, id: Uuid) -> LegacoreResult<Company> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('company', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CompanyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id_str,
        })?;

        Ok(row.into_company(id))
    }

    async fn get_by_slug(&self, slug: &str) -> LegacoreResult<Company> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM company WHERE slug = $slug",
            )
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CompanyRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: slug.to_string(),
        })?;

        Ok(row.try_into_company()?)
    }

    async fn list(&self, query: ListQuery) -> LegacoreResult<PaginatedResult<Company>> {
        let (rows, total) = fetch_page::<C, CompanyRowWithId>(&self.db, "company", &query).await?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_company())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            page: query.page,
        })
    }

    async fn counts(&self, id: Uuid) -> LegacoreResult<CompanyCounts> {
        let (users, cases, documents) = tokio::try_join!(
            count_for_tenant(&self.db, "user", id),
            count_for_tenant(&self.db, "legal_case", id),
            count_for_tenant(&self.db, "document", id),
        )?;
        Ok(CompanyCounts {
            users,
            cases,
            documents,
        })
    }
}
