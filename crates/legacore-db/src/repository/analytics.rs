//! SurrealDB implementation of [`AnalyticsRepository`].

use chrono::{DateTime, Utc};
use legacore_core::error::{LegacoreError, LegacoreResult};
use legacore_core::models::analytics::{AnalyticsRecord, CreateAnalyticsRecord};
use legacore_core::query::ListQuery;
use legacore_core::repository::{AnalyticsRepository, PaginatedResult};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};
use crate::filter::fetch_page;

const ENTITY: &str = "Analytics record";

#[derive(Debug, SurrealValue)]
struct AnalyticsRowWithId {
    record_id: String,
    company_id: String,
    metric_name: String,
    metric_value: f64,
    period: String,
    metadata: serde_json::Value,
    recorded_at: DateTime<Utc>,
}

impl AnalyticsRowWithId {
    fn try_into_record(self) -> Result<AnalyticsRecord, DbError> {
        Ok(AnalyticsRecord {
            id: parse_uuid(&self.record_id, "analytics")?,
            company_id: parse_uuid(&self.company_id, "company")?,
            metric_name: self.metric_name,
            metric_value: self.metric_value,
            period: self.period,
            metadata: self.metadata,
            recorded_at: self.recorded_at,
        })
    }
}

/// SurrealDB implementation of the Analytics repository.
#[derive(Clone)]
pub struct SurrealAnalyticsRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAnalyticsRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AnalyticsRepository for SurrealAnalyticsRepository<C> {
    async fn record(&self, input: CreateAnalyticsRecord) -> LegacoreResult<AnalyticsRecord> {
        let id_str = Uuid::new_v4().to_string();
        let metadata = input
            .metadata
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let result = self
            .db
            .query(
                "CREATE type::record('analytics', $id) SET \
                 company_id = $company_id, metric_name = $metric_name, \
                 metric_value = $metric_value, period = $period, \
                 metadata = $metadata; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('analytics', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("company_id", input.company_id.to_string()))
            .bind(("metric_name", input.metric_name))
            .bind(("metric_value", input.metric_value))
            .bind(("period", input.period))
            .bind(("metadata", metadata))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(e, ENTITY))?;

        let rows: Vec<AnalyticsRowWithId> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id_str,
        })?;

        Ok(row.try_into_record()?)
    }

    async fn list(&self, query: ListQuery) -> LegacoreResult<PaginatedResult<AnalyticsRecord>> {
        query.filter.tenant_id().ok_or(LegacoreError::TenantContext)?;
        let (rows, total) =
            fetch_page::<C, AnalyticsRowWithId>(&self.db, "analytics", &query).await?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_record())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            page: query.page,
        })
    }
}
