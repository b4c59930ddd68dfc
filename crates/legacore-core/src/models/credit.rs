//! Credit account and transaction log.
//!
//! Invariant: `balance = total_purchased - total_used` and the balance
//! never goes negative. Every balance change is written together with
//! its transaction record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EnumField;
use crate::error::{LegacoreError, LegacoreResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditTransactionType {
    Purchase,
    Usage,
}

impl EnumField for CreditTransactionType {
    const FIELD: &'static str = "type";
    const ALL: &'static [Self] = &[Self::Purchase, Self::Usage];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "PURCHASE",
            Self::Usage => "USAGE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditAccount {
    pub id: Uuid,
    pub company_id: Uuid,
    pub balance: i64,
    pub total_purchased: i64,
    pub total_used: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CreditAccount {
    /// Balance after applying `kind` for `amount`, or a validation error
    /// if the amount is not positive or the balance would go negative.
    pub fn apply(&self, kind: CreditTransactionType, amount: i64) -> LegacoreResult<Self> {
        if amount <= 0 {
            return Err(LegacoreError::validation(
                "Credit amount must be a positive integer",
            ));
        }
        let mut next = self.clone();
        match kind {
            CreditTransactionType::Purchase => {
                next.total_purchased += amount;
                next.balance += amount;
            }
            CreditTransactionType::Usage => {
                if self.balance < amount {
                    return Err(LegacoreError::validation(format!(
                        "Insufficient credits: balance {} is less than {amount}",
                        self.balance
                    )));
                }
                next.total_used += amount;
                next.balance -= amount;
            }
        }
        Ok(next)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTransaction {
    pub id: Uuid,
    pub credit_id: Uuid,
    #[serde(rename = "type")]
    pub kind: CreditTransactionType,
    pub amount: i64,
    pub description: Option<String>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateCreditTransaction {
    pub company_id: Uuid,
    pub kind: CreditTransactionType,
    pub amount: i64,
    pub description: Option<String>,
    pub user_id: Option<Uuid>,
}

/// Account state plus its most recent transactions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditStatement {
    pub account: CreditAccount,
    pub transactions: Vec<CreditTransaction>,
}
