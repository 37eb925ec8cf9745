//! Linked item model and bank-link request/response types.
//!
//! A linked item is one external bank connection: the aggregator's item id,
//! the durable access credential obtained by the token exchange, institution
//! metadata, and the resumable sync cursor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a linked item record from the database.
///
/// # Database Table
///
/// Maps to the `linked_items` table. Each item:
/// - Belongs to one user
/// - Is unique on the aggregator's `item_id`
/// - Carries the pagination cursor the sync loop resumes from
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LinkedItem {
    /// Unique identifier for this item
    pub id: Uuid,

    /// User that owns this bank connection
    pub user_id: Uuid,

    /// Aggregator-side item identifier
    pub item_id: String,

    /// Durable access credential for the aggregator API
    ///
    /// Never serialized into API responses.
    pub access_token: String,

    /// Aggregator-side institution identifier, if known
    pub institution_id: Option<String>,

    /// Institution display name, if known
    pub institution_name: Option<String>,

    /// Change-feed cursor from the last completed sync page
    ///
    /// `None` until the first sync; the first request then pulls the full
    /// available history.
    pub cursor: Option<String>,

    /// When the sync loop last persisted a page for this item
    pub last_synced_at: Option<DateTime<Utc>>,

    /// Timestamp when the bank was linked
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /api/v1/link/exchange`.
#[derive(Debug, Deserialize)]
pub struct ExchangeRequest {
    /// Temporary token produced by the Link widget on success
    pub public_token: String,
}

/// Response body for a successful token exchange.
#[derive(Debug, Serialize)]
pub struct ExchangeResponse {
    /// Aggregator-side id of the newly linked item
    pub item_id: String,
}

/// Response body for linked-item listings.
///
/// Excludes the access credential and the cursor; neither belongs to
/// clients.
#[derive(Debug, Serialize)]
pub struct LinkedItemResponse {
    pub id: Uuid,
    pub item_id: String,
    pub institution_id: Option<String>,
    pub institution_name: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<LinkedItem> for LinkedItemResponse {
    fn from(item: LinkedItem) -> Self {
        Self {
            id: item.id,
            item_id: item.item_id,
            institution_id: item.institution_id,
            institution_name: item.institution_name,
            last_synced_at: item.last_synced_at,
            created_at: item.created_at,
        }
    }
}
