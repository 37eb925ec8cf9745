//! Transaction read HTTP handlers.
//!
//! Transactions are written exclusively by the sync loop; this module only
//! serves reads:
//! - GET /api/v1/transactions - List synced transactions, newest first

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::transaction::{ListTransactionsQuery, Transaction, TransactionResponse},
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

/// List synced transactions for the authenticated user.
///
/// # Endpoint
///
/// `GET /api/v1/transactions?account_id=<uuid>&limit=<n>`
///
/// # Query Parameters
///
/// - `account_id` (optional): restrict to one account
/// - `limit` (optional): max rows, default 100, capped at 500
///
/// # Ordering
///
/// Date descending, ties broken by insertion time so pages are stable.
pub async fn list_transactions(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let limit = query.effective_limit();

    let transactions = match query.account_id {
        Some(account_id) => {
            sqlx::query_as::<_, Transaction>(
                "SELECT * FROM transactions
                 WHERE user_id = $1 AND account_id = $2
                 ORDER BY date DESC, created_at DESC
                 LIMIT $3",
            )
            .bind(auth.user_id)
            .bind(account_id)
            .bind(limit)
            .fetch_all(&pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Transaction>(
                "SELECT * FROM transactions
                 WHERE user_id = $1
                 ORDER BY date DESC, created_at DESC
                 LIMIT $2",
            )
            .bind(auth.user_id)
            .bind(limit)
            .fetch_all(&pool)
            .await?
        }
    };

    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}
