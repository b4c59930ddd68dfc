//! SurrealDB implementation of [`CaseRepository`].

use chrono::{DateTime, Utc};
use legacore_core::error::{LegacoreError, LegacoreResult};
use legacore_core::models::EnumField;
use legacore_core::models::case::{Case, CaseStatus, CreateCase, UpdateCase};
use legacore_core::query::ListQuery;
use legacore_core::repository::{CaseRepository, PaginatedResult};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::user::user_refs;
use crate::error::{DbError, parse_opt_uuid, parse_uuid};
use crate::filter::{fetch_all_for_tenant, fetch_page};

const ENTITY: &str = "Case";
const TABLE: &str = "legal_case";

#[derive(Debug, SurrealValue)]
struct CaseRowWithId {
    record_id: String,
    company_id: String,
    case_number: String,
    title: String,
    description: Option<String>,
    status: String,
    priority: i64,
    amount: Option<f64>,
    currency: String,
    assigned_to_id: Option<String>,
    due_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CaseRowWithId {
    fn try_into_case(self) -> Result<Case, DbError> {
        let status = CaseStatus::parse(&self.status).map_err(|e| DbError::Corrupt(e.to_string()))?;
        let priority = u8::try_from(self.priority)
            .map_err(|e| DbError::Corrupt(format!("invalid priority: {e}")))?;
        Ok(Case {
            id: parse_uuid(&self.record_id, "case")?,
            company_id: parse_uuid(&self.company_id, "company")?,
            case_number: self.case_number,
            title: self.title,
            description: self.description,
            status,
            priority,
            amount: self.amount,
            currency: self.currency,
            assigned_to_id: parse_opt_uuid(self.assigned_to_id, "assignee")?,
            assigned_to: None,
            due_date: self.due_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Case repository.
#[derive(Clone)]
pub struct SurrealCaseRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCaseRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Reject an assignee that is not a user of `company_id`.
    async fn check_assignee(&self, company_id: Uuid, assignee: Option<Uuid>) -> LegacoreResult<()> {
        if let Some(user_id) = assignee {
            let found = user_refs(&self.db, company_id, &[user_id]).await?;
            if !found.contains_key(&user_id) {
                return Err(LegacoreError::validation(
                    "Assigned user does not belong to this company",
                ));
            }
        }
        Ok(())
    }

    /// Fill `assigned_to` on every case from one lookup.
    async fn attach_assignees(&self, company_id: Uuid, cases: &mut [Case]) -> Result<(), DbError> {
        let ids: Vec<Uuid> = cases.iter().filter_map(|c| c.assigned_to_id).collect();
        let refs = user_refs(&self.db, company_id, &ids).await?;
        for case in cases {
            case.assigned_to = case.assigned_to_id.and_then(|id| refs.get(&id).cloned());
        }
        Ok(())
    }

    async fn fetch(&self, company_id: Uuid, id: Uuid) -> Result<Option<Case>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('legal_case', $id) \
                 WHERE company_id = $company_id",
            )
            .bind(("id", id.to_string()))
            .bind(("company_id", company_id.to_string()))
            .await?;
        let rows: Vec<CaseRowWithId> = result.take(0)?;
        rows.into_iter().next().map(|r| r.try_into_case()).transpose()
    }
}

impl<C: Connection> CaseRepository for SurrealCaseRepository<C> {
    async fn create(&self, input: CreateCase) -> LegacoreResult<Case> {
        self.check_assignee(input.company_id, input.assigned_to_id)
            .await?;

        let id = Uuid::new_v4();

        let result = self
            .db
            .query(
                "CREATE type::record('legal_case', $id) SET \
                 company_id = $company_id, case_number = $case_number, \
                 title = $title, description = $description, \
                 status = $status, priority = $priority, \
                 amount = $amount, currency = $currency, \
                 assigned_to_id = $assigned_to_id, due_date = $due_date",
            )
            .bind(("id", id.to_string()))
            .bind(("company_id", input.company_id.to_string()))
            .bind(("case_number", input.case_number))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("status", input.status.as_str().to_string()))
            .bind(("priority", i64::from(input.priority)))
            .bind(("amount", input.amount))
            .bind(("currency", input.currency))
            .bind((
                "assigned_to_id",
                input.assigned_to_id.map(|u| u.to_string()),
            ))
            .bind(("due_date", input.due_date))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::from_check(e, ENTITY))?;

        let case = self.get_by_id(input.company_id, id).await?;
        info!(case_id = %case.id, case_number = %case.case_number, "Case created");
        Ok(case)
    }

    async fn get_by_id(&self, company_id: Uuid, id: Uuid) -> LegacoreResult<Case> {
        let case = self
            .fetch(company_id, id)
            .await?
            .ok_or_else(|| LegacoreError::not_found(ENTITY, id.to_string()))?;
        let mut cases = [case];
        self.attach_assignees(company_id, &mut cases).await?;
        let [case] = cases;
        Ok(case)
    }

    async fn update(&self, company_id: Uuid, id: Uuid, input: UpdateCase) -> LegacoreResult<Case> {
        if self.fetch(company_id, id).await?.is_none() {
            return Err(LegacoreError::not_found(ENTITY, id.to_string()));
        }
        if let Some(assignee) = input.assigned_to_id {
            self.check_assignee(company_id, assignee).await?;
        }

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.priority.is_some() {
            sets.push("priority = $priority");
        }
        if input.amount.is_some() {
            sets.push("amount = $amount");
        }
        if input.assigned_to_id.is_some() {
            sets.push("assigned_to_id = $assigned_to_id");
        }
        if input.due_date.is_some() {
            sets.push("due_date = $due_date");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('legal_case', $id) SET {} \
             WHERE company_id = $company_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id.to_string()))
            .bind(("company_id", company_id.to_string()));

        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(priority) = input.priority {
            builder = builder.bind(("priority", i64::from(priority)));
        }
        if let Some(amount) = input.amount {
            builder = builder.bind(("amount", amount));
        }
        if let Some(assignee) = input.assigned_to_id {
            builder = builder.bind(("assigned_to_id", assignee.map(|u| u.to_string())));
        }
        if let Some(due_date) = input.due_date {
            builder = builder.bind(("due_date", due_date));
        }

        let result = builder.await.map_err(DbError::from)?;
        result
            .check()
            .map_err(|e| DbError::from_check(e, ENTITY))?;

        self.get_by_id(company_id, id).await
    }

    async fn list(&self, query: ListQuery) -> LegacoreResult<PaginatedResult<Case>> {
        let company_id = query.filter.tenant_id().ok_or(LegacoreError::TenantContext)?;
        let (rows, total) = fetch_page::<C, CaseRowWithId>(&self.db, TABLE, &query).await?;

        let mut items = rows
            .into_iter()
            .map(|row| row.try_into_case())
            .collect::<Result<Vec<_>, DbError>>()?;
        self.attach_assignees(company_id, &mut items).await?;

        Ok(PaginatedResult {
            items,
            total,
            page: query.page,
        })
    }

    async fn all(&self, company_id: Uuid) -> LegacoreResult<Vec<Case>> {
        let rows: Vec<CaseRowWithId> = fetch_all_for_tenant(&self.db, TABLE, company_id).await?;
        Ok(rows
            .into_iter()
            .map(|row| row.try_into_case())
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
