//! Account read HTTP handlers.
//!
//! Accounts are written exclusively by the sync loop; these endpoints only
//! read them:
//! - GET /api/v1/accounts - List synced accounts
//! - GET /api/v1/accounts/summary - Net worth across all accounts

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::account::{Account, AccountResponse, BalanceSummaryResponse, net_worth},
};
use axum::{Extension, Json, extract::State};

/// List all synced accounts for the authenticated user.
///
/// # Endpoint
///
/// `GET /api/v1/accounts`
///
/// # Ordering
///
/// Largest current balance first; accounts with no reported balance sort
/// last.
pub async fn list_accounts(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    let accounts = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, user_id, linked_item_id, plaid_account_id, name, official_name,
               type, subtype, mask, balance_current, balance_available,
               balance_limit, currency_code, created_at, updated_at
        FROM accounts
        WHERE user_id = $1
        ORDER BY balance_current DESC NULLS LAST
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

/// Net worth summary for the authenticated user.
///
/// # Endpoint
///
/// `GET /api/v1/accounts/summary`
///
/// # Response
///
/// ```json
/// {
///   "net_worth": 1234.56,
///   "account_count": 3
/// }
/// ```
///
/// Net worth is the signed sum of display balances: credit-type accounts
/// count against the total because their balance is money owed.
pub async fn balance_summary(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<BalanceSummaryResponse>, AppError> {
    let accounts = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, user_id, linked_item_id, plaid_account_id, name, official_name,
               type, subtype, mask, balance_current, balance_available,
               balance_limit, currency_code, created_at, updated_at
        FROM accounts
        WHERE user_id = $1
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(BalanceSummaryResponse {
        net_worth: net_worth(&accounts),
        account_count: accounts.len(),
    }))
}
