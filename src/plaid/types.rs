//! Wire types for the aggregator API.
//!
//! These structs mirror the JSON shapes the Plaid API returns. Fields the
//! application never reads are simply not declared; serde ignores unknown
//! keys on deserialization.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Response from `POST /link/token/create`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkTokenCreateResponse {
    /// Token consumed by the client-side Link widget.
    pub link_token: String,
}

/// Response from `POST /item/public_token/exchange`.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemPublicTokenExchangeResponse {
    /// Durable access credential for the linked item.
    pub access_token: String,

    /// Aggregator-side identifier of the item.
    pub item_id: String,
}

/// Response from `POST /item/get`.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemGetResponse {
    pub item: ItemInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemInfo {
    #[serde(default)]
    pub institution_id: Option<String>,
}

/// Response from `POST /institutions/get_by_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct InstitutionsGetByIdResponse {
    pub institution: Institution,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Institution {
    pub name: String,
}

/// One page of the `POST /transactions/sync` change feed.
///
/// `has_more` is the continuation flag: while it is true the caller must
/// request the next page with `next_cursor`. The final `next_cursor` is
/// persisted so the next sync run resumes where this one stopped.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionsSyncResponse {
    /// Accounts associated with the item, sent with every page.
    #[serde(default)]
    pub accounts: Vec<PlaidAccount>,

    /// Transactions created since the cursor.
    #[serde(default)]
    pub added: Vec<PlaidTransaction>,

    /// Transactions changed since the cursor (e.g., pending -> posted).
    #[serde(default)]
    pub modified: Vec<PlaidTransaction>,

    /// Transactions deleted upstream since the cursor.
    #[serde(default)]
    pub removed: Vec<RemovedTransaction>,

    /// Whether another page is available.
    pub has_more: bool,

    /// Cursor for the next request (or the next sync run).
    pub next_cursor: String,
}

/// Account as reported by the aggregator.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaidAccount {
    pub account_id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub official_name: Option<String>,

    /// Last 2-4 digits of the account number.
    #[serde(default)]
    pub mask: Option<String>,

    /// Top-level type: depository, credit, loan, investment, ...
    #[serde(default, rename = "type")]
    pub account_type: Option<String>,

    #[serde(default)]
    pub subtype: Option<String>,

    #[serde(default)]
    pub balances: PlaidBalances,
}

/// Balance block nested inside an account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaidBalances {
    #[serde(default)]
    pub available: Option<Decimal>,

    #[serde(default)]
    pub current: Option<Decimal>,

    /// Credit limit; only present for credit-type accounts.
    #[serde(default)]
    pub limit: Option<Decimal>,

    #[serde(default)]
    pub iso_currency_code: Option<String>,
}

/// Transaction as reported by the aggregator.
///
/// `account_id` refers to the *provider's* account identifier; the sync loop
/// resolves it to a local account UUID before persisting.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaidTransaction {
    pub transaction_id: String,

    pub account_id: String,

    /// Positive for money leaving the account, negative for money entering.
    pub amount: Decimal,

    pub date: NaiveDate,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub merchant_name: Option<String>,

    #[serde(default)]
    pub category: Option<Vec<String>>,

    #[serde(default)]
    pub pending: bool,
}

/// Entry in the `removed` list of a sync page.
#[derive(Debug, Clone, Deserialize)]
pub struct RemovedTransaction {
    pub transaction_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_sync_page() {
        let body = r#"{
            "accounts": [{
                "account_id": "acc-1",
                "name": "Checking",
                "official_name": "Everyday Checking",
                "mask": "4321",
                "type": "depository",
                "subtype": "checking",
                "balances": {
                    "available": 95.50,
                    "current": 110.25,
                    "limit": null,
                    "iso_currency_code": "USD"
                }
            }],
            "added": [{
                "transaction_id": "tx-1",
                "account_id": "acc-1",
                "amount": 12.34,
                "date": "2026-07-01",
                "name": "Coffee Shop",
                "merchant_name": "Blue Bottle",
                "category": ["Food and Drink", "Coffee"],
                "pending": false
            }],
            "modified": [],
            "removed": [{"transaction_id": "tx-gone"}],
            "has_more": true,
            "next_cursor": "cursor-2",
            "request_id": "req-abc"
        }"#;

        let page: TransactionsSyncResponse = serde_json::from_str(body).unwrap();
        assert_eq!(page.accounts.len(), 1);
        assert_eq!(page.accounts[0].account_type.as_deref(), Some("depository"));
        assert_eq!(
            page.accounts[0].balances.current,
            Some(Decimal::new(11025, 2))
        );
        assert_eq!(page.accounts[0].balances.limit, None);

        assert_eq!(page.added.len(), 1);
        assert_eq!(page.added[0].amount, Decimal::new(1234, 2));
        assert_eq!(
            page.added[0].date,
            NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
        );
        assert_eq!(page.added[0].category.as_ref().unwrap().len(), 2);

        assert_eq!(page.removed[0].transaction_id, "tx-gone");
        assert!(page.has_more);
        assert_eq!(page.next_cursor, "cursor-2");
    }

    #[test]
    fn missing_optional_fields_default() {
        // Sandbox items sometimes omit balances entirely.
        let body = r#"{
            "accounts": [{"account_id": "acc-2"}],
            "added": [],
            "modified": [],
            "removed": [],
            "has_more": false,
            "next_cursor": "final"
        }"#;

        let page: TransactionsSyncResponse = serde_json::from_str(body).unwrap();
        let account = &page.accounts[0];
        assert_eq!(account.name, None);
        assert_eq!(account.balances.current, None);
        assert!(!page.has_more);
    }
}
