//! Transaction data models and API response types.
//!
//! Transactions are written exclusively by the sync loop; the HTTP surface
//! only reads them.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a transaction record from the database.
///
/// # Database Table
///
/// Maps to the `transactions` table. Each transaction:
/// - Belongs to one user and one local account
/// - Is unique on (user_id, plaid_transaction_id); an upsert against that
///   key is how "modified" feed entries update rows in place
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Transaction {
    /// Unique identifier for this transaction
    pub id: Uuid,

    /// User that owns this transaction
    pub user_id: Uuid,

    /// Local account the transaction belongs to
    pub account_id: Uuid,

    /// Aggregator-side transaction identifier
    pub plaid_transaction_id: String,

    /// Amount in the account's currency
    ///
    /// Positive for money leaving the account, negative for money
    /// entering (the aggregator's convention).
    pub amount: Decimal,

    /// Date the transaction posted or was authorized
    pub date: NaiveDate,

    /// Transaction description from the institution
    pub name: Option<String>,

    /// Cleaned-up merchant name, when the aggregator can derive one
    pub merchant_name: Option<String>,

    /// Category hierarchy, broadest first
    pub category: Option<Vec<String>>,

    /// Whether the transaction is still pending settlement
    pub pending: bool,

    /// Timestamp when the row was first written
    pub created_at: DateTime<Utc>,
}

/// Query parameters for `GET /api/v1/transactions`.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Restrict to one account
    pub account_id: Option<Uuid>,

    /// Maximum rows to return (default 100, capped at 500)
    pub limit: Option<i64>,
}

impl ListTransactionsQuery {
    /// Effective row limit after defaulting and clamping.
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(100).clamp(1, 500)
    }
}

/// Response body for transaction listings.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub name: Option<String>,
    pub merchant_name: Option<String>,
    pub category: Option<Vec<String>>,
    pub pending: bool,
}

impl From<Transaction> for TransactionResponse {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.id,
            account_id: transaction.account_id,
            amount: transaction.amount,
            date: transaction.date,
            name: transaction.name,
            merchant_name: transaction.merchant_name,
            category: transaction.category,
            pending: transaction.pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        let q = ListTransactionsQuery {
            account_id: None,
            limit: None,
        };
        assert_eq!(q.effective_limit(), 100);

        let q = ListTransactionsQuery {
            account_id: None,
            limit: Some(9999),
        };
        assert_eq!(q.effective_limit(), 500);

        let q = ListTransactionsQuery {
            account_id: None,
            limit: Some(0),
        };
        assert_eq!(q.effective_limit(), 1);
    }
}
