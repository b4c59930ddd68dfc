//! SurrealDB implementation of [`ProjectRepository`].

use chrono::{DateTime, Utc};
use legacore_core::error::{LegacoreError, LegacoreResult};
use legacore_core::models::project::{CreateProject, Project};
use legacore_core::query::ListQuery;
use legacore_core::repository::{PaginatedResult, ProjectRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};
use crate::filter::{fetch_all_for_tenant, fetch_page};

const ENTITY: &str = "Project";
const TABLE: &str = "project";

#[derive(Debug, SurrealValue)]
struct ProjectRowWithId {
    record_id: String,
    company_id: String,
    name: String,
    description: Option<String>,
    status: String,
    budget: Option<f64>,
    currency: String,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProjectRowWithId {
    fn try_into_project(self) -> Result<Project, DbError> {
        Ok(Project {
            id: parse_uuid(&self.record_id, "project")?,
            company_id: parse_uuid(&self.company_id, "company")?,
            name: self.name,
            description: self.description,
            status: self.status,
            budget: self.budget,
            currency: self.currency,
            start_date: self.start_date,
            end_date: self.end_date,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Project repository.
#[derive(Clone)]
pub struct SurrealProjectRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProjectRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProjectRepository for SurrealProjectRepository<C> {
    async fn create(&self, input: CreateProject) -> LegacoreResult<Project> {
        let id_str = Uuid::new_v4().to_string();
        let metadata = input
            .metadata
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let result = self
            .db
            .query(
                "CREATE type::record('project', $id) SET \
                 company_id = $company_id, name = $name, \
                 description = $description, status = $status, \
                 budget = $budget, currency = $currency, \
                 start_date = $start_date, end_date = $end_date, \
                 metadata = $metadata; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('project', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("company_id", input.company_id.to_string()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("status", input.status))
            .bind(("budget", input.budget))
            .bind(("currency", input.currency))
            .bind(("start_date", input.start_date))
            .bind(("end_date", input.end_date))
            .bind(("metadata", metadata))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(e, ENTITY))?;

        let rows: Vec<ProjectRowWithId> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id_str,
        })?;

        Ok(row.try_into_project()?)
    }

    async fn list(&self, query: ListQuery) -> LegacoreResult<PaginatedResult<Project>> {
        query.filter.tenant_id().ok_or(LegacoreError::TenantContext)?;
        let (rows, total) = fetch_page::<C, ProjectRowWithId>(&self.db, TABLE, &query).await?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_project())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            page: query.page,
        })
    }

    async fn all(&self, company_id: Uuid) -> LegacoreResult<Vec<Project>> {
        let rows: Vec<ProjectRowWithId> = fetch_all_for_tenant(&self.db, TABLE, company_id).await?;
        Ok(rows
            .into_iter()
            .map(|row| row.try_into_project())
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
