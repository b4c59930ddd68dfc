//! SurrealDB implementation of [`CreditRepository`].
//!
//! A balance change and its transaction record are written inside one
//! `BEGIN TRANSACTION ... COMMIT TRANSACTION` block. The `UPDATE` is
//! guarded on the resulting balance, so a usage that lost a race against
//! another usage aborts the whole block instead of overdrawing.

use chrono::{DateTime, Utc};
use legacore_core::error::{LegacoreError, LegacoreResult};
use legacore_core::models::EnumField;
use legacore_core::models::credit::{
    CreateCreditTransaction, CreditAccount, CreditTransaction, CreditTransactionType,
};
use legacore_core::query::{Direction, Filter, ListQuery, PageRequest, Scope, SortKey};
use legacore_core::repository::{CreditRepository, PaginatedResult};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{info, warn};
use uuid::Uuid;

use super::user::user_refs;
use crate::error::{DbError, REJECT_PREFIX, parse_opt_uuid, parse_uuid};
use crate::filter::fetch_page;

const ENTITY: &str = "Credit account";

const NEWEST_FIRST: &[SortKey] = &[SortKey {
    field: "created_at",
    direction: Direction::Desc,
}];

#[derive(Debug, SurrealValue)]
struct CreditRowWithId {
    record_id: String,
    company_id: String,
    balance: i64,
    total_purchased: i64,
    total_used: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CreditRowWithId {
    fn try_into_account(self) -> Result<CreditAccount, DbError> {
        Ok(CreditAccount {
            id: parse_uuid(&self.record_id, "credit")?,
            company_id: parse_uuid(&self.company_id, "company")?,
            balance: self.balance,
            total_purchased: self.total_purchased,
            total_used: self.total_used,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct TransactionRowWithId {
    record_id: String,
    credit_id: String,
    kind: String,
    amount: i64,
    description: Option<String>,
    user_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl TransactionRowWithId {
    fn try_into_transaction(self) -> Result<CreditTransaction, DbError> {
        let kind = CreditTransactionType::parse(&self.kind)
            .map_err(|e| DbError::Corrupt(e.to_string()))?;
        Ok(CreditTransaction {
            id: parse_uuid(&self.record_id, "credit transaction")?,
            credit_id: parse_uuid(&self.credit_id, "credit")?,
            kind,
            amount: self.amount,
            description: self.description,
            user_id: parse_opt_uuid(self.user_id, "user")?,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Credit repository.
#[derive(Clone)]
pub struct SurrealCreditRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCreditRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn transaction_by_id(&self, id: &str) -> Result<CreditTransaction, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('credit_transaction', $id)",
            )
            .bind(("id", id.to_string()))
            .await?;
        let rows: Vec<TransactionRowWithId> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "Credit transaction".into(),
                id: id.to_string(),
            })?
            .try_into_transaction()
    }
}

impl<C: Connection> CreditRepository for SurrealCreditRepository<C> {
    async fn get_account(&self, company_id: Uuid) -> LegacoreResult<CreditAccount> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM credit \
                 WHERE company_id = $company_id",
            )
            .bind(("company_id", company_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CreditRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: company_id.to_string(),
        })?;

        Ok(row.try_into_account()?)
    }

    async fn apply(
        &self,
        input: CreateCreditTransaction,
    ) -> LegacoreResult<(CreditAccount, CreditTransaction)> {
        let account = self.get_account(input.company_id).await?;
        // Validates amount and balance before touching the store.
        account.apply(input.kind, input.amount)?;

        if let Some(user_id) = input.user_id {
            let found = user_refs(&self.db, input.company_id, &[user_id]).await?;
            if !found.contains_key(&user_id) {
                return Err(LegacoreError::validation(
                    "Acting user does not belong to this company",
                ));
            }
        }

        let (delta, purchased, used) = match input.kind {
            CreditTransactionType::Purchase => (input.amount, input.amount, 0),
            CreditTransactionType::Usage => (-input.amount, 0, input.amount),
        };
        let tx_id = Uuid::new_v4().to_string();

        let query = format!(
            "BEGIN TRANSACTION; \
             LET $updated = (UPDATE type::record('credit', $credit_id) SET \
                 balance = balance + $delta, \
                 total_purchased = total_purchased + $purchased, \
                 total_used = total_used + $used, \
                 updated_at = time::now() \
                 WHERE balance + $delta >= 0 RETURN AFTER); \
             IF array::len($updated) = 0 {{ \
                 THROW '{REJECT_PREFIX}Insufficient credits'; \
             }}; \
             CREATE type::record('credit_transaction', $tx_id) SET \
                 credit_id = $credit_id, company_id = $company_id, \
                 kind = $kind, amount = $amount, \
                 description = $description, user_id = $user_id; \
             COMMIT TRANSACTION;"
        );

        let result = self
            .db
            .query(query)
            .bind(("credit_id", account.id.to_string()))
            .bind(("company_id", input.company_id.to_string()))
            .bind(("delta", delta))
            .bind(("purchased", purchased))
            .bind(("used", used))
            .bind(("tx_id", tx_id.clone()))
            .bind(("kind", input.kind.as_str().to_string()))
            .bind(("amount", input.amount))
            .bind(("description", input.description))
            .bind(("user_id", input.user_id.map(|u| u.to_string())))
            .await
            .map_err(DbError::from)?;

        if let Err(e) = result.check() {
            // A concurrent change may have invalidated the pre-check; report
            // it against the fresh balance when that explains the abort.
            let fresh = self.get_account(input.company_id).await?;
            fresh.apply(input.kind, input.amount)?;
            warn!(company_id = %input.company_id, "Credit transaction aborted");
            return Err(DbError::from_check(e, ENTITY).into());
        }

        let account = self.get_account(input.company_id).await?;
        let transaction = self.transaction_by_id(&tx_id).await?;
        info!(
            company_id = %input.company_id,
            kind = input.kind.as_str(),
            amount = input.amount,
            balance = account.balance,
            "Credit transaction applied"
        );
        Ok((account, transaction))
    }

    async fn transactions(
        &self,
        company_id: Uuid,
        page: PageRequest,
    ) -> LegacoreResult<PaginatedResult<CreditTransaction>> {
        let query = ListQuery {
            filter: Filter::new(Scope::Tenant(company_id)),
            order: NEWEST_FIRST,
            page,
        };
        let (rows, total) =
            fetch_page::<C, TransactionRowWithId>(&self.db, "credit_transaction", &query).await?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_transaction())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult { items, total, page })
    }
}
