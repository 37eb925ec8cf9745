//! Sync trigger HTTP handler.

use crate::{
    AppState,
    error::AppError,
    middleware::auth::AuthContext,
    services::sync_service::{self, SyncReport},
};
use axum::{Extension, Json, extract::State};

/// Run the transaction sync loop for the authenticated user.
///
/// # Endpoint
///
/// `POST /api/v1/sync`
///
/// Pages through the aggregator's change feed for every linked item, one
/// item at a time, and returns a per-item report. An aggregator failure on
/// one item is reported in its entry and does not stop the others; a
/// database failure fails the whole request.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "items": [{
///     "item_id": "550e8400-e29b-41d4-a716-446655440000",
///     "institution_name": "First Platypus Bank",
///     "pages": 2,
///     "accounts_upserted": 3,
///     "transactions_upserted": 48,
///     "transactions_removed": 1,
///     "transactions_skipped": 0,
///     "error": null
///   }]
/// }
/// ```
pub async fn run_sync(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<SyncReport>, AppError> {
    let report = sync_service::sync_all_items(&state.pool, &state.plaid, auth.user_id).await?;

    Ok(Json(report))
}
