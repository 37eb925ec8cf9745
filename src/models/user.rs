//! User model and authentication request/response types.
//!
//! Users authenticate with email + password and receive an opaque session
//! token. Only the argon2 hash of the password and the SHA-256 hash of the
//! session token are ever stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a user record from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique identifier for this user
    pub id: Uuid,

    /// Login email, unique across users
    pub email: String,

    /// Argon2 PHC-format hash of the password
    pub password_hash: String,

    /// Timestamp when the user registered
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /api/v1/auth/register`.
///
/// # JSON Example
///
/// ```json
/// {
///   "email": "user@example.com",
///   "password": "correct horse battery staple"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response body for `GET /api/v1/auth/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: Uuid,
    pub email: String,
}

/// Response body for successful register/login.
///
/// The `token` is shown exactly once; the server keeps only its hash.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Bearer token for subsequent requests
    pub token: String,

    /// Id of the authenticated user
    pub user_id: Uuid,

    /// Email of the authenticated user
    pub email: String,
}
