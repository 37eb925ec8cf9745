//! Authentication HTTP handlers.
//!
//! This module implements the session-based auth endpoints:
//! - POST /api/v1/auth/register - Create a user and a first session
//! - POST /api/v1/auth/login - Verify credentials, mint a session
//! - GET /api/v1/auth/me - Describe the authenticated session
//! - POST /api/v1/auth/logout - Delete the presented session
//!
//! Passwords are stored as argon2 hashes; session tokens are 32 random
//! bytes handed to the client as hex, stored only as SHA-256 digests.

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::{AuthContext, hash_token},
    models::user::{AuthResponse, LoginRequest, MeResponse, RegisterRequest, User},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;

/// Register a new user.
///
/// # Endpoint
///
/// `POST /api/v1/auth/register`
///
/// # Request Body
///
/// ```json
/// {
///   "email": "user@example.com",
///   "password": "correct horse battery staple"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: Returns a session token for immediate use
/// - **Error (400)**: Email or password fails validation
/// - **Error (409)**: Email already registered
pub async fn register(
    State(pool): State<DbPool>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_credentials(&request.email, &request.password)?;

    let password_hash = hash_password(&request.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password_hash)
        VALUES ($1, $2)
        RETURNING id, email, password_hash, created_at
        "#,
    )
    .bind(request.email.trim().to_lowercase())
    .bind(&password_hash)
    .fetch_one(&pool)
    .await
    .map_err(|err| {
        // The unique index on email is the only constraint this insert can hit
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return AppError::EmailTaken;
            }
        }
        AppError::from(err)
    })?;

    let token = issue_session(&pool, user.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user_id: user.id,
            email: user.email,
        }),
    ))
}

/// Log an existing user in.
///
/// # Endpoint
///
/// `POST /api/v1/auth/login`
///
/// # Response
///
/// - **Success (200 OK)**: Returns a fresh session token
/// - **Error (401)**: Unknown email or wrong password (indistinguishable)
pub async fn login(
    State(pool): State<DbPool>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
    )
    .bind(request.email.trim().to_lowercase())
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&request.password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = issue_session(&pool, user.id).await?;

    Ok(Json(AuthResponse {
        token,
        user_id: user.id,
        email: user.email,
    }))
}

/// Describe the authenticated session.
///
/// # Endpoint
///
/// `GET /api/v1/auth/me`
///
/// Lets the client restore its signed-in state from a stored token.
pub async fn me(Extension(auth): Extension<AuthContext>) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: auth.user_id,
        email: auth.email,
    })
}

/// Log the authenticated session out.
///
/// # Endpoint
///
/// `POST /api/v1/auth/logout`
///
/// Deletes only the session that made this request; other devices stay
/// logged in. Returns 204 No Content.
pub async fn logout(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<StatusCode, AppError> {
    sqlx::query("DELETE FROM sessions WHERE id = $1")
        .bind(auth.session_id)
        .execute(&pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Mint a session token for a user and store its hash.
///
/// The plaintext token leaves this function exactly once, in the response
/// to the client.
async fn issue_session(pool: &DbPool, user_id: Uuid) -> Result<String, AppError> {
    // 32 random bytes, shown to the client as 64 hex characters
    let token = hex::encode(rand::random::<[u8; 32]>());
    let token_hash = hash_token(&token);

    sqlx::query(
        "INSERT INTO sessions (user_id, token_hash, expires_at)
         VALUES ($1, $2, NOW() + INTERVAL '30 days')",
    )
    .bind(user_id)
    .bind(&token_hash)
    .execute(pool)
    .await?;

    Ok(token)
}

/// Reject obviously unusable registration input.
fn validate_credentials(email: &str, password: &str) -> Result<(), AppError> {
    if !email.contains('@') || email.trim().len() < 3 {
        return Err(AppError::InvalidRequest(
            "A valid email address is required".to_string(),
        ));
    }
    if password.len() < 8 {
        return Err(AppError::InvalidRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

/// Hash a password with argon2 and a fresh random salt.
fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AppError::Internal(format!("Password hashing failed: {err}")))
}

/// Verify a password against a stored argon2 hash.
fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|err| AppError::Internal(format!("Stored password hash is invalid: {err}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trips() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password("hunter2hunter2", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_short_password_and_bad_email() {
        assert!(validate_credentials("user@example.com", "longenough").is_ok());
        assert!(validate_credentials("user@example.com", "short").is_err());
        assert!(validate_credentials("not-an-email", "longenough").is_err());
    }
}
