//! Sync service - the cursor-based transaction synchronization loop.
//!
//! For every linked item the loop pages through the aggregator's change
//! feed: fetch a page, upsert its accounts, resolve provider account ids to
//! local UUIDs, upsert the merged added+modified transaction batch, delete
//! whatever the feed removed, persist the cursor, repeat while the feed
//! reports more pages.
//!
//! # Delivery Semantics
//!
//! The cursor is persisted only after a page is fully processed. A crash
//! mid-page means the next run re-fetches the same page; the upsert keys
//! (user, provider id) make the replay harmless. At-least-once, made
//! idempotent by the store.
//!
//! # Failure Policy
//!
//! An aggregator failure aborts the current item's pagination and the loop
//! moves on to the next linked item; there is no backoff or retry. Database
//! failures abort the whole sync invocation.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::linked_item::LinkedItem,
    plaid::{
        PlaidAccount, PlaidClient, PlaidTransaction, RemovedTransaction, TransactionsSyncResponse,
    },
};

/// Report for one sync invocation, one entry per linked item.
#[derive(Debug, Serialize)]
pub struct SyncReport {
    pub items: Vec<ItemSyncOutcome>,
}

/// Outcome of paging one linked item's change feed.
#[derive(Debug, Serialize)]
pub struct ItemSyncOutcome {
    /// Local id of the linked item
    pub item_id: Uuid,

    pub institution_name: Option<String>,

    /// Pages fully processed this run
    pub pages: u32,

    pub accounts_upserted: u64,

    pub transactions_upserted: u64,

    /// Rows deleted because the feed listed them as removed
    pub transactions_removed: u64,

    /// Feed entries dropped because their account id did not resolve to a
    /// local account
    pub transactions_skipped: u64,

    /// Aggregator error that aborted this item's pagination, if any
    pub error: Option<String>,
}

/// A transaction ready for the upsert batch: provider fields plus the
/// resolved local account id.
#[derive(Debug, Clone)]
struct TransactionUpsert {
    account_id: Uuid,
    plaid_transaction_id: String,
    amount: Decimal,
    date: NaiveDate,
    name: Option<String>,
    merchant_name: Option<String>,
    category: Option<Vec<String>>,
    pending: bool,
}

/// Sync every linked item belonging to a user, strictly one after another.
pub async fn sync_all_items(
    pool: &DbPool,
    plaid: &PlaidClient,
    user_id: Uuid,
) -> Result<SyncReport, AppError> {
    let items = sqlx::query_as::<_, LinkedItem>(
        "SELECT * FROM linked_items WHERE user_id = $1 ORDER BY created_at",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut outcomes = Vec::with_capacity(items.len());
    for item in &items {
        outcomes.push(sync_item(pool, plaid, item).await?);
    }

    Ok(SyncReport { items: outcomes })
}

/// Page through one item's change feed until it reports no more pages.
async fn sync_item(
    pool: &DbPool,
    plaid: &PlaidClient,
    item: &LinkedItem,
) -> Result<ItemSyncOutcome, AppError> {
    let mut outcome = ItemSyncOutcome {
        item_id: item.id,
        institution_name: item.institution_name.clone(),
        pages: 0,
        accounts_upserted: 0,
        transactions_upserted: 0,
        transactions_removed: 0,
        transactions_skipped: 0,
        error: None,
    };

    // Resume from wherever the last run stopped; None pulls full history.
    let mut cursor = item.cursor.clone();
    let mut has_more = true;

    while has_more {
        let page = match plaid
            .transactions_sync(&item.access_token, cursor.as_deref())
            .await
        {
            Ok(page) => page,
            Err(err) => {
                // Abort this item's pagination; the caller continues with
                // the next linked item.
                tracing::error!("Sync aborted for item {}: {err}", item.item_id);
                outcome.error = Some(err.to_string());
                break;
            }
        };
        outcome.pages += 1;

        // Accounts first: transactions on this page reference them.
        outcome.accounts_upserted += upsert_accounts(pool, item, &page.accounts).await?;

        let account_map = load_account_map(pool, item.user_id).await?;
        let (batch, skipped) = build_transaction_batch(&page.added, &page.modified, &account_map);
        if skipped > 0 {
            tracing::warn!(
                "Dropped {skipped} transactions with unresolved accounts for item {}",
                item.item_id
            );
        }
        outcome.transactions_skipped += skipped as u64;
        outcome.transactions_upserted += upsert_transactions(pool, item.user_id, &batch).await?;
        outcome.transactions_removed +=
            remove_transactions(pool, item.user_id, &page.removed).await?;

        // Persisted only after the full page is in the store; a crash above
        // re-fetches this page on the next run.
        persist_cursor(pool, item.id, &page.next_cursor).await?;

        has_more = advance(&mut cursor, &page);
    }

    tracing::info!(
        "Synced item {}: {} pages, {} accounts, {} transactions",
        item.item_id,
        outcome.pages,
        outcome.accounts_upserted,
        outcome.transactions_upserted
    );

    Ok(outcome)
}

/// Advance loop state from a completed page.
///
/// The in-memory cursor always takes the page's `next_cursor` (the final
/// cursor of a run is what the *next* run resumes from); the return value
/// is the feed's continuation flag.
fn advance(cursor: &mut Option<String>, page: &TransactionsSyncResponse) -> bool {
    *cursor = Some(page.next_cursor.clone());
    page.has_more
}

/// Merge the feed's added and modified lists into one upsert batch,
/// resolving provider account ids to local UUIDs.
///
/// Entries whose account id is not in the map are excluded from the batch;
/// the count of exclusions is returned alongside. A transaction appearing
/// in both lists yields two batch entries with the same upsert key, so the
/// later (modified) version wins in the store.
fn build_transaction_batch(
    added: &[PlaidTransaction],
    modified: &[PlaidTransaction],
    account_map: &HashMap<String, Uuid>,
) -> (Vec<TransactionUpsert>, usize) {
    let mut batch = Vec::with_capacity(added.len() + modified.len());
    let mut skipped = 0;

    for tx in added.iter().chain(modified) {
        match account_map.get(&tx.account_id) {
            Some(&account_id) => batch.push(TransactionUpsert {
                account_id,
                plaid_transaction_id: tx.transaction_id.clone(),
                amount: tx.amount,
                date: tx.date,
                name: tx.name.clone(),
                merchant_name: tx.merchant_name.clone(),
                category: tx.category.clone(),
                pending: tx.pending,
            }),
            None => skipped += 1,
        }
    }

    (batch, skipped)
}

/// Upsert a page's accounts keyed on (user_id, plaid_account_id).
async fn upsert_accounts(
    pool: &DbPool,
    item: &LinkedItem,
    accounts: &[PlaidAccount],
) -> Result<u64, AppError> {
    let mut upserted = 0;
    for account in accounts {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (
                user_id, linked_item_id, plaid_account_id, name, official_name,
                type, subtype, mask, balance_current, balance_available,
                balance_limit, currency_code, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW())
            ON CONFLICT (user_id, plaid_account_id) DO UPDATE SET
                name = EXCLUDED.name,
                official_name = EXCLUDED.official_name,
                type = EXCLUDED.type,
                subtype = EXCLUDED.subtype,
                mask = EXCLUDED.mask,
                balance_current = EXCLUDED.balance_current,
                balance_available = EXCLUDED.balance_available,
                balance_limit = EXCLUDED.balance_limit,
                currency_code = EXCLUDED.currency_code,
                updated_at = NOW()
            "#,
        )
        .bind(item.user_id)
        .bind(item.id)
        .bind(&account.account_id)
        .bind(account.name.clone())
        .bind(account.official_name.clone())
        .bind(account.account_type.clone())
        .bind(account.subtype.clone())
        .bind(account.mask.clone())
        .bind(account.balances.current)
        .bind(account.balances.available)
        .bind(account.balances.limit)
        .bind(
            account
                .balances
                .iso_currency_code
                .clone()
                .unwrap_or_else(|| "USD".to_string()),
        )
        .execute(pool)
        .await?;

        upserted += result.rows_affected();
    }

    Ok(upserted)
}

/// Load the provider-account-id -> local-id map for a user.
async fn load_account_map(pool: &DbPool, user_id: Uuid) -> Result<HashMap<String, Uuid>, AppError> {
    let rows: Vec<(String, Uuid)> =
        sqlx::query_as("SELECT plaid_account_id, id FROM accounts WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().collect())
}

/// Upsert the merged transaction batch keyed on (user_id, plaid_transaction_id).
async fn upsert_transactions(
    pool: &DbPool,
    user_id: Uuid,
    batch: &[TransactionUpsert],
) -> Result<u64, AppError> {
    let mut upserted = 0;
    for row in batch {
        let result = sqlx::query(
            r#"
            INSERT INTO transactions (
                user_id, account_id, plaid_transaction_id, amount, date,
                name, merchant_name, category, pending
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id, plaid_transaction_id) DO UPDATE SET
                account_id = EXCLUDED.account_id,
                amount = EXCLUDED.amount,
                date = EXCLUDED.date,
                name = EXCLUDED.name,
                merchant_name = EXCLUDED.merchant_name,
                category = EXCLUDED.category,
                pending = EXCLUDED.pending
            "#,
        )
        .bind(user_id)
        .bind(row.account_id)
        .bind(&row.plaid_transaction_id)
        .bind(row.amount)
        .bind(row.date)
        .bind(row.name.clone())
        .bind(row.merchant_name.clone())
        .bind(row.category.clone())
        .bind(row.pending)
        .execute(pool)
        .await?;

        upserted += result.rows_affected();
    }

    Ok(upserted)
}

/// Delete transactions the feed reports as removed upstream.
async fn remove_transactions(
    pool: &DbPool,
    user_id: Uuid,
    removed: &[RemovedTransaction],
) -> Result<u64, AppError> {
    if removed.is_empty() {
        return Ok(0);
    }

    let ids: Vec<String> = removed
        .iter()
        .map(|r| r.transaction_id.clone())
        .collect();

    let result = sqlx::query(
        "DELETE FROM transactions WHERE user_id = $1 AND plaid_transaction_id = ANY($2)",
    )
    .bind(user_id)
    .bind(ids)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Record the page's cursor and the sync time on the linked item.
async fn persist_cursor(pool: &DbPool, item_id: Uuid, cursor: &str) -> Result<(), AppError> {
    sqlx::query("UPDATE linked_items SET cursor = $1, last_synced_at = NOW() WHERE id = $2")
        .bind(cursor)
        .bind(item_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_tx(transaction_id: &str, account_id: &str) -> PlaidTransaction {
        PlaidTransaction {
            transaction_id: transaction_id.to_string(),
            account_id: account_id.to_string(),
            amount: Decimal::new(1234, 2),
            date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            name: Some("Coffee Shop".to_string()),
            merchant_name: None,
            category: None,
            pending: false,
        }
    }

    fn page(has_more: bool, next_cursor: &str) -> TransactionsSyncResponse {
        TransactionsSyncResponse {
            accounts: vec![],
            added: vec![],
            modified: vec![],
            removed: vec![],
            has_more,
            next_cursor: next_cursor.to_string(),
        }
    }

    #[test]
    fn batch_excludes_unresolved_accounts() {
        let known = Uuid::new_v4();
        let account_map = HashMap::from([("acc-known".to_string(), known)]);

        let added = vec![feed_tx("tx-1", "acc-known"), feed_tx("tx-2", "acc-missing")];
        let (batch, skipped) = build_transaction_batch(&added, &[], &account_map);

        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].account_id, known);
        assert_eq!(batch[0].plaid_transaction_id, "tx-1");
        assert_eq!(skipped, 1);
    }

    #[test]
    fn batch_merges_added_and_modified_in_order() {
        let known = Uuid::new_v4();
        let account_map = HashMap::from([("acc".to_string(), known)]);

        let added = vec![feed_tx("tx-1", "acc")];
        let mut changed = feed_tx("tx-1", "acc");
        changed.pending = true;
        let modified = vec![changed, feed_tx("tx-2", "acc")];

        let (batch, skipped) = build_transaction_batch(&added, &modified, &account_map);

        // Same provider id twice: the modified entry comes later, so its
        // upsert lands last and wins in the store.
        assert_eq!(skipped, 0);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].plaid_transaction_id, "tx-1");
        assert!(!batch[0].pending);
        assert_eq!(batch[1].plaid_transaction_id, "tx-1");
        assert!(batch[1].pending);
        assert_eq!(batch[2].plaid_transaction_id, "tx-2");
    }

    #[test]
    fn batch_of_empty_feed_is_empty() {
        let (batch, skipped) = build_transaction_batch(&[], &[], &HashMap::new());
        assert!(batch.is_empty());
        assert_eq!(skipped, 0);
    }

    #[test]
    fn loop_terminates_when_feed_has_no_more_pages() {
        let mut cursor = None;

        assert!(advance(&mut cursor, &page(true, "cursor-2")));
        assert_eq!(cursor.as_deref(), Some("cursor-2"));

        // Continuation flag false: the loop must stop, but the final cursor
        // is still taken so the next run resumes past this page.
        assert!(!advance(&mut cursor, &page(false, "cursor-3")));
        assert_eq!(cursor.as_deref(), Some("cursor-3"));
    }
}
