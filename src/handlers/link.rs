//! Bank-link HTTP handlers.
//!
//! This module implements the linking flow around the aggregator's Link
//! widget:
//! - GET /api/v1/link/token - Create a token that boots the widget
//! - POST /api/v1/link/exchange - Trade the widget's public token for a
//!   stored bank connection
//! - GET /api/v1/items - List the user's linked bank connections

use crate::{
    AppState,
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::linked_item::{ExchangeRequest, ExchangeResponse, LinkedItem, LinkedItemResponse},
    plaid::PlaidClient,
    services::link_service,
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// Response body for link-token creation.
#[derive(Debug, Serialize)]
pub struct LinkTokenResponse {
    /// Token consumed by the client-side Link widget
    pub link_token: String,
}

/// Create a link token for the authenticated user.
///
/// # Endpoint
///
/// `GET /api/v1/link/token`
///
/// The authenticated user's id is passed to the aggregator as the link
/// session's `client_user_id`.
///
/// # Response
///
/// - **Success (200 OK)**: `{"link_token": "link-sandbox-..."}`
/// - **Error (502)**: The aggregator rejected the request
pub async fn create_link_token(
    State(plaid): State<PlaidClient>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<LinkTokenResponse>, AppError> {
    let response = plaid.create_link_token(&auth.user_id.to_string()).await?;

    Ok(Json(LinkTokenResponse {
        link_token: response.link_token,
    }))
}

/// Exchange a public token for a stored bank connection.
///
/// # Endpoint
///
/// `POST /api/v1/link/exchange`
///
/// # Request Body
///
/// ```json
/// {
///   "public_token": "public-sandbox-..."
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: `{"item_id": "..."}`
/// - **Error (502)**: Token exchange failed at the aggregator
pub async fn exchange_token(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<ExchangeRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.public_token.is_empty() {
        return Err(AppError::InvalidRequest(
            "public_token is required".to_string(),
        ));
    }

    let item = link_service::exchange_public_token(
        &state.pool,
        &state.plaid,
        auth.user_id,
        &request.public_token,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ExchangeResponse {
            item_id: item.item_id,
        }),
    ))
}

/// List the authenticated user's linked bank connections.
///
/// # Endpoint
///
/// `GET /api/v1/items`
///
/// Returns connections newest-first. Access credentials and cursors never
/// appear in the response.
pub async fn list_items(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<LinkedItemResponse>>, AppError> {
    let items = sqlx::query_as::<_, LinkedItem>(
        "SELECT * FROM linked_items WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(auth.user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(items.into_iter().map(Into::into).collect()))
}
