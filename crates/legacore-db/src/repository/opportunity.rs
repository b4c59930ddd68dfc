//! SurrealDB implementation of [`OpportunityRepository`].
//!
//! Opportunities are global records; list queries run with
//! [`Scope::Global`](legacore_core::query::Scope::Global).

use chrono::{DateTime, Utc};
use legacore_core::error::{LegacoreError, LegacoreResult};
use legacore_core::models::opportunity::{ContractOpportunity, CreateContractOpportunity};
use legacore_core::query::ListQuery;
use legacore_core::repository::{OpportunityRepository, PaginatedResult};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};
use crate::filter::fetch_page;

const ENTITY: &str = "Contract opportunity";
const TABLE: &str = "contract_opportunity";

#[derive(Debug, SurrealValue)]
struct OpportunityRowWithId {
    record_id: String,
    solicitation: String,
    title: String,
    agency: String,
    description: Option<String>,
    posted_date: DateTime<Utc>,
    response_deadline: DateTime<Utc>,
    set_value: Option<f64>,
    place_of_performance: Option<String>,
    naics_code: Option<String>,
    psc_code: Option<String>,
    contact_info: Option<String>,
    url: Option<String>,
    ai_score: f64,
    ai_summary: Option<String>,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OpportunityRowWithId {
    fn try_into_opportunity(self) -> Result<ContractOpportunity, DbError> {
        Ok(ContractOpportunity {
            id: parse_uuid(&self.record_id, "opportunity")?,
            solicitation: self.solicitation,
            title: self.title,
            agency: self.agency,
            description: self.description,
            posted_date: self.posted_date,
            response_deadline: self.response_deadline,
            set_value: self.set_value,
            place_of_performance: self.place_of_performance,
            naics_code: self.naics_code,
            psc_code: self.psc_code,
            contact_info: self.contact_info,
            url: self.url,
            ai_score: self.ai_score,
            ai_summary: self.ai_summary,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct IdRow {
    #[allow(dead_code)]
    record_id: String,
}

/// SurrealDB implementation of the contract opportunity repository.
#[derive(Clone)]
pub struct SurrealOpportunityRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOpportunityRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn solicitation_taken(&self, solicitation: &str) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id FROM contract_opportunity \
                 WHERE solicitation = $solicitation LIMIT 1",
            )
            .bind(("solicitation", solicitation.to_string()))
            .await?;
        let rows: Vec<IdRow> = result.take(0)?;
        Ok(!rows.is_empty())
    }
}

impl<C: Connection> OpportunityRepository for SurrealOpportunityRepository<C> {
    async fn create(&self, input: CreateContractOpportunity) -> LegacoreResult<ContractOpportunity> {
        if self.solicitation_taken(&input.solicitation).await? {
            return Err(LegacoreError::already_exists(ENTITY));
        }

        let id_str = Uuid::new_v4().to_string();
        let metadata = input
            .metadata
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let result = self
            .db
            .query(
                "CREATE type::record('contract_opportunity', $id) SET \
                 solicitation = $solicitation, title = $title, \
                 agency = $agency, description = $description, \
                 posted_date = $posted_date, \
                 response_deadline = $response_deadline, \
                 set_value = $set_value, \
                 place_of_performance = $place_of_performance, \
                 naics_code = $naics_code, psc_code = $psc_code, \
                 contact_info = $contact_info, url = $url, \
                 ai_score = $ai_score, ai_summary = $ai_summary, \
                 metadata = $metadata; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('contract_opportunity', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("solicitation", input.solicitation))
            .bind(("title", input.title))
            .bind(("agency", input.agency))
            .bind(("description", input.description))
            .bind(("posted_date", input.posted_date))
            .bind(("response_deadline", input.response_deadline))
            .bind(("set_value", input.set_value))
            .bind(("place_of_performance", input.place_of_performance))
            .bind(("naics_code", input.naics_code))
            .bind(("psc_code", input.psc_code))
            .bind(("contact_info", input.contact_info))
            .bind(("url", input.url))
            .bind(("ai_score", input.ai_score))
            .bind(("ai_summary", input.ai_summary))
            .bind(("metadata", metadata))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(e, ENTITY))?;

        let rows: Vec<OpportunityRowWithId> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id_str,
        })?;

        let opportunity = row.try_into_opportunity()?;
        info!(
            opportunity_id = %opportunity.id,
            solicitation = %opportunity.solicitation,
            ai_score = opportunity.ai_score,
            "Contract opportunity created"
        );
        Ok(opportunity)
    }

    async fn list(&self, query: ListQuery) -> LegacoreResult<PaginatedResult<ContractOpportunity>> {
        let (rows, total) = fetch_page::<C, OpportunityRowWithId>(&self.db, TABLE, &query).await?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_opportunity())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            page: query.page,
        })
    }

    async fn all(&self) -> LegacoreResult<Vec<ContractOpportunity>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM contract_opportunity \
                 ORDER BY ai_score DESC, response_deadline ASC",
            )
            .await
            .map_err(DbError::from)?;
        let rows: Vec<OpportunityRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| row.try_into_opportunity())
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
