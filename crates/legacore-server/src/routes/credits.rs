//! Per-tenant credit balance and its transaction log.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Query, State};
use legacore_core::error::require_fields;
use legacore_core::models::credit::{
    CreateCreditTransaction, CreditAccount, CreditStatement, CreditTransaction,
    CreditTransactionType,
};
use legacore_core::query::{PageRequest, QueryParams};
use legacore_core::repository::CreditRepository;
use serde::{Deserialize, Serialize};

use super::{Created, created, parse_opt_id};
use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;
use crate::tenant::Tenant;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditRequest {
    pub amount: Option<i64>,
    pub description: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreditReceipt {
    pub account: CreditAccount,
    pub transaction: CreditTransaction,
}

/// Account plus most recent transactions (`page`, `limit`).
pub async fn statement(
    State(state): State<AppState>,
    Tenant(company): Tenant,
    Query(raw): Query<BTreeMap<String, String>>,
) -> ApiResult<Json<CreditStatement>> {
    let page = PageRequest::from_params(&QueryParams::from(raw));
    let (account, transactions) = tokio::try_join!(
        state.credits.get_account(company.id),
        state.credits.transactions(company.id, page),
    )?;
    Ok(Json(CreditStatement {
        account,
        transactions: transactions.items,
    }))
}

pub async fn purchase(
    state: State<AppState>,
    tenant: Tenant,
    body: ApiJson<CreditRequest>,
) -> ApiResult<Created<CreditReceipt>> {
    apply(state, tenant, body, CreditTransactionType::Purchase).await
}

pub async fn consume(
    state: State<AppState>,
    tenant: Tenant,
    body: ApiJson<CreditRequest>,
) -> ApiResult<Created<CreditReceipt>> {
    apply(state, tenant, body, CreditTransactionType::Usage).await
}

async fn apply(
    State(state): State<AppState>,
    Tenant(company): Tenant,
    ApiJson(body): ApiJson<CreditRequest>,
    kind: CreditTransactionType,
) -> ApiResult<Created<CreditReceipt>> {
    require_fields(&[("amount", body.amount.is_some())])?;

    let (account, transaction) = state
        .credits
        .apply(CreateCreditTransaction {
            company_id: company.id,
            kind,
            amount: body.amount.unwrap_or_default(),
            description: body.description,
            user_id: parse_opt_id("userId", body.user_id.as_deref())?,
        })
        .await?;
    Ok(created(CreditReceipt {
        account,
        transaction,
    }))
}
