//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::plaid::PlaidError;

/// Application-wide error type.
///
/// This enum represents all possible errors that can occur in the application.
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Authentication Errors**: Missing/expired sessions, bad credentials
/// - **Resource Errors**: Requested resources not found
/// - **Aggregator Errors**: Failures reported by the Plaid API
/// - **Validation Errors**: Invalid request data
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// This wraps any sqlx::Error using the `#[from]` attribute, which
    /// automatically implements `From<sqlx::Error> for AppError`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Session token is missing, unknown, or expired.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid session token")]
    InvalidSessionToken,

    /// Email and password did not match a known user.
    ///
    /// Returns HTTP 401 Unauthorized. Deliberately identical for
    /// "unknown email" and "wrong password".
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// A user with this email already exists.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("Email already registered")]
    EmailTaken,

    /// Requested linked item does not exist or doesn't belong to the
    /// authenticated user.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Linked item not found")]
    ItemNotFound,

    /// Requested account does not exist or doesn't belong to the
    /// authenticated user.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Account not found")]
    AccountNotFound,

    /// The aggregator API rejected a request or could not be reached.
    ///
    /// Returns HTTP 502 Bad Gateway with the aggregator's error message,
    /// mirroring how sync failures surface to the client.
    #[error("Aggregator error: {0}")]
    Aggregator(#[from] PlaidError),

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// Internal failure that is not the client's fault (e.g., password
    /// hashing error). Details are logged, never sent to the client.
    #[error("Internal error")]
    Internal(String),
}

/// Convert AppError into an HTTP response.
///
/// This implementation allows Axum handlers to return `Result<T, AppError>`
/// and have errors automatically converted to proper HTTP responses.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map each error variant to (HTTP status, error code, message)
        let (status, code, message) = match self {
            AppError::InvalidSessionToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_session_token",
                self.to_string(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                self.to_string(),
            ),
            AppError::EmailTaken => (StatusCode::CONFLICT, "email_taken", self.to_string()),
            AppError::ItemNotFound => (StatusCode::NOT_FOUND, "item_not_found", self.to_string()),
            AppError::AccountNotFound => {
                (StatusCode::NOT_FOUND, "account_not_found", self.to_string())
            }
            AppError::Aggregator(ref err) => {
                (StatusCode::BAD_GATEWAY, "aggregator_error", err.to_string())
            }
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Database(ref err) => {
                tracing::error!("Database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        // Build JSON response body
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        // Return the response with status code and JSON body
        (status, body).into_response()
    }
}
