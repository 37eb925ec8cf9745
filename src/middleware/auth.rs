//! Session token authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the session token from the Authorization header
//! 2. Hash it and verify a live session exists in the database
//! 3. Inject authentication context into the request
//! 4. Reject unauthorized requests with HTTP 401

use crate::{db::DbPool, error::AppError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Authentication context attached to authenticated requests.
///
/// This struct is inserted into the request's extension map and can be
/// extracted by route handlers to know who made the request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Id of the authenticated user
    ///
    /// Used to scope every database query (items, accounts, transactions
    /// are all filtered by this).
    pub user_id: Uuid,

    /// Email of the authenticated user
    pub email: String,

    /// Id of the session row backing this request (used by logout)
    pub session_id: Uuid,
}

/// Session row joined with its user, as loaded during authentication.
#[derive(Debug, sqlx::FromRow)]
struct SessionUser {
    session_id: Uuid,
    user_id: Uuid,
    email: String,
}

/// SHA-256 hex digest of a session token.
///
/// Tokens are stored hashed so a leaked database dump does not yield
/// usable credentials. Shared with the auth handlers that mint sessions.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Session authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <token>` header from request
/// 2. Hash the `<token>` using SHA-256
/// 3. Query database for a matching, unexpired session joined to its user
/// 4. If found: inject `AuthContext` into request, call next handler
/// 5. If not found: return 401 Unauthorized error
pub async fn auth_middleware(
    State(pool): State<DbPool>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extract Authorization header
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::InvalidSessionToken)?;

    // Expected format: "Bearer <session_token>"
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::InvalidSessionToken)?;

    let token_hash = hash_token(token);

    // Expired sessions are treated exactly like unknown ones
    let session = sqlx::query_as::<_, SessionUser>(
        "SELECT s.id AS session_id, u.id AS user_id, u.email
         FROM sessions s
         JOIN users u ON u.id = s.user_id
         WHERE s.token_hash = $1 AND s.expires_at > NOW()",
    )
    .bind(&token_hash)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::InvalidSessionToken)?;

    let auth_context = AuthContext {
        user_id: session.user_id,
        email: session.email,
        session_id: session.session_id,
    };

    // Route handlers can now extract this using Extension<AuthContext>
    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_hash_is_sha256_hex() {
        // Stable digest: the same token must always map to the same row.
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash_token("abc").len(), 64);
        assert_ne!(hash_token("abc"), hash_token("abd"));
    }
}
