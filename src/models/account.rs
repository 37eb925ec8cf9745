//! Account data models and API response types.
//!
//! This module defines:
//! - `Account`: Database entity representing a synced bank account
//! - `AccountResponse`: Response body returned to clients
//! - `BalanceSummaryResponse` and the net-worth fold behind it

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Represents an account record from the database.
///
/// # Database Table
///
/// Maps to the `accounts` table. Each account:
/// - Belongs to one user and one linked item
/// - Is unique on (user_id, plaid_account_id), which is what makes the
///   sync loop's upserts idempotent
///
/// # Balance Storage
///
/// Balances are NUMERIC columns mapped to `Decimal`; the aggregator reports
/// them as decimal dollar amounts. All three are nullable — the aggregator
/// omits whichever it cannot compute (e.g., `limit` for a checking account).
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Account {
    /// Unique identifier for this account
    pub id: Uuid,

    /// User that owns this account
    pub user_id: Uuid,

    /// Bank connection this account was discovered through
    pub linked_item_id: Uuid,

    /// Aggregator-side account identifier
    pub plaid_account_id: String,

    /// Display name ("Plaid Checking")
    pub name: Option<String>,

    /// Full product name from the institution
    pub official_name: Option<String>,

    /// Top-level type: depository, credit, loan, investment, ...
    #[sqlx(rename = "type")]
    pub account_type: Option<String>,

    /// Finer-grained subtype: checking, savings, credit card, ...
    pub subtype: Option<String>,

    /// Last 2-4 digits of the account number
    pub mask: Option<String>,

    /// Posted balance
    pub balance_current: Option<Decimal>,

    /// Balance available to spend (posted minus holds)
    pub balance_available: Option<Decimal>,

    /// Credit limit, for credit-type accounts
    pub balance_limit: Option<Decimal>,

    /// ISO 4217 currency code, defaults to "USD"
    pub currency_code: String,

    /// Timestamp when the account was first synced
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last balance update from the sync loop
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Balance used for display and summary purposes.
    ///
    /// Prefers the posted balance and falls back to the available balance,
    /// treating a fully unknown balance as zero.
    pub fn display_balance(&self) -> Decimal {
        self.balance_current
            .or(self.balance_available)
            .unwrap_or(Decimal::ZERO)
    }

    /// Display balance with the sign adjusted for net-worth math.
    ///
    /// Credit-type accounts report what is *owed* as a positive number, so
    /// they count against net worth.
    pub fn signed_balance(&self) -> Decimal {
        let balance = self.display_balance();
        if self.account_type.as_deref() == Some("credit") {
            -balance
        } else {
            balance
        }
    }
}

/// Net worth across a set of accounts: the signed sum of display balances.
pub fn net_worth(accounts: &[Account]) -> Decimal {
    accounts.iter().map(Account::signed_balance).sum()
}

/// Response body for account endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "name": "Plaid Checking",
///   "official_name": "Plaid Gold Standard 0% Interest Checking",
///   "type": "depository",
///   "subtype": "checking",
///   "mask": "0000",
///   "balance_current": 110.0,
///   "balance_available": 100.0,
///   "balance_limit": null,
///   "currency_code": "USD",
///   "created_at": "2026-07-01T10:00:00Z",
///   "updated_at": "2026-07-02T10:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub linked_item_id: Uuid,
    pub name: Option<String>,
    pub official_name: Option<String>,
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    pub subtype: Option<String>,
    pub mask: Option<String>,
    pub balance_current: Option<Decimal>,
    pub balance_available: Option<Decimal>,
    pub balance_limit: Option<Decimal>,
    pub currency_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Convert database Account to API AccountResponse.
///
/// Removes the internal user and provider identifiers.
impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            linked_item_id: account.linked_item_id,
            name: account.name,
            official_name: account.official_name,
            account_type: account.account_type,
            subtype: account.subtype,
            mask: account.mask,
            balance_current: account.balance_current,
            balance_available: account.balance_available,
            balance_limit: account.balance_limit,
            currency_code: account.currency_code,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Response body for `GET /api/v1/accounts/summary`.
#[derive(Debug, Serialize)]
pub struct BalanceSummaryResponse {
    /// Signed sum of display balances, credit accounts negated
    pub net_worth: Decimal,

    /// Number of accounts included in the sum
    pub account_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(
        account_type: Option<&str>,
        current: Option<Decimal>,
        available: Option<Decimal>,
    ) -> Account {
        Account {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            linked_item_id: Uuid::new_v4(),
            plaid_account_id: "acc".to_string(),
            name: None,
            official_name: None,
            account_type: account_type.map(str::to_string),
            subtype: None,
            mask: None,
            balance_current: current,
            balance_available: available,
            balance_limit: None,
            currency_code: "USD".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn net_worth_negates_credit_accounts() {
        let accounts = vec![
            account(Some("depository"), Some(Decimal::new(10000, 2)), None),
            account(Some("credit"), Some(Decimal::new(2500, 2)), None),
        ];

        // 100.00 checking - 25.00 owed on the card
        assert_eq!(net_worth(&accounts), Decimal::new(7500, 2));
    }

    #[test]
    fn display_balance_falls_back_to_available() {
        let a = account(Some("depository"), None, Some(Decimal::new(4200, 2)));
        assert_eq!(a.display_balance(), Decimal::new(4200, 2));

        let b = account(Some("depository"), None, None);
        assert_eq!(b.display_balance(), Decimal::ZERO);
    }

    #[test]
    fn net_worth_of_no_accounts_is_zero() {
        assert_eq!(net_worth(&[]), Decimal::ZERO);
    }

    #[test]
    fn untyped_accounts_count_positive() {
        let accounts = vec![account(None, Some(Decimal::new(500, 2)), None)];
        assert_eq!(net_worth(&accounts), Decimal::new(500, 2));
    }
}
