//! Link service - turns a Link widget success into a stored bank connection.
//!
//! The exchange flow mirrors the aggregator's: trade the temporary public
//! token for a durable access token, look up institution metadata on a
//! best-effort basis, and upsert the linked item keyed on the aggregator's
//! item id so re-linking the same bank does not create a second connection.

use uuid::Uuid;

use crate::{db::DbPool, error::AppError, models::linked_item::LinkedItem, plaid::PlaidClient};

/// Exchange a public token and persist the resulting linked item.
///
/// # Process
///
/// 1. Exchange the public token for (access_token, item_id)
/// 2. Look up the institution id and name (non-fatal on failure)
/// 3. Upsert `linked_items` on conflict with `item_id`
///
/// The stored sync cursor survives a re-link: the conflict update touches
/// only the credential and institution metadata.
pub async fn exchange_public_token(
    pool: &DbPool,
    plaid: &PlaidClient,
    user_id: Uuid,
    public_token: &str,
) -> Result<LinkedItem, AppError> {
    let exchanged = plaid.exchange_public_token(public_token).await?;

    let (institution_id, institution_name) =
        lookup_institution(plaid, &exchanged.access_token).await;

    let item = sqlx::query_as::<_, LinkedItem>(
        r#"
        INSERT INTO linked_items (user_id, item_id, access_token, institution_id, institution_name)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (item_id) DO UPDATE SET
            access_token = EXCLUDED.access_token,
            institution_id = EXCLUDED.institution_id,
            institution_name = EXCLUDED.institution_name
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&exchanged.item_id)
    .bind(&exchanged.access_token)
    .bind(&institution_id)
    .bind(&institution_name)
    .fetch_one(pool)
    .await?;

    tracing::info!(
        "Linked item {} ({})",
        item.item_id,
        item.institution_name.as_deref().unwrap_or("unknown institution")
    );

    Ok(item)
}

/// Best-effort institution lookup for a freshly exchanged access token.
///
/// Linking must succeed even when metadata is unavailable, so every failure
/// here degrades to `None` with a warning.
async fn lookup_institution(
    plaid: &PlaidClient,
    access_token: &str,
) -> (Option<String>, Option<String>) {
    let institution_id = match plaid.get_item(access_token).await {
        Ok(response) => response.item.institution_id,
        Err(err) => {
            tracing::warn!("Item metadata lookup failed: {err}");
            None
        }
    };

    let Some(institution_id) = institution_id else {
        return (None, None);
    };

    let institution_name = match plaid.get_institution(&institution_id).await {
        Ok(response) => Some(response.institution.name),
        Err(err) => {
            tracing::warn!("Institution lookup failed for {institution_id}: {err}");
            None
        }
    };

    (Some(institution_id), institution_name)
}
