//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Bazaar                                 │
//! │                                                                         │
//! │  Handler: Result<Json<T>, ApiError>                                    │
//! │         │                                                               │
//! │         ├── AuthError        (guard)     ──┐                            │
//! │         ├── ValidationError  (core)      ──┤                            │
//! │         ├── CoreError        (split)     ──┼──► ApiError ──► Response   │
//! │         └── DbError          (store)     ──┘      │                     │
//! │                                                   ▼                     │
//! │                                  HTTP status + { "code", "message" }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Store failures are logged with their details and reach the client as a
//! generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bazaar_core::{AuthError, CoreError, ValidationError};
use bazaar_db::DbError;
use serde::Serialize;
use ts_rs::TS;

/// API error returned from every handler.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_OWNER",
///   "message": "Not authorized to modify product 6f1c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
///
/// Auth failures each get their own code so clients can tell "log in again"
/// apart from "you may not do this".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No bearer token (401)
    MissingToken,

    /// Bad signature, expired or malformed token (403)
    InvalidToken,

    /// Role does not satisfy the endpoint policy (403)
    InsufficientRole,

    /// Caller does not own the resource (403)
    NotOwner,

    /// Wrong password (401)
    InvalidCredentials,

    /// Admin self-registration is disabled (403)
    AdminRegistrationDisabled,

    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Checkout without items (400)
    EmptyOrder,

    /// Line item quantity out of range (400)
    InvalidQuantity,

    /// Username or email already taken (409)
    Conflict,

    /// Some vendor sub-orders were written, then the store failed (500)
    PartialOrderBatch,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::MissingToken | ErrorCode::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ErrorCode::InvalidToken
            | ErrorCode::InsufficientRole
            | ErrorCode::NotOwner
            | ErrorCode::AdminRegistrationDisabled => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError | ErrorCode::EmptyOrder | ErrorCode::InvalidQuantity => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::PartialOrderBatch | ErrorCode::DatabaseError | ErrorCode::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Result type for handlers and services.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Conversions
// =============================================================================

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let code = match &err {
            AuthError::MissingToken => ErrorCode::MissingToken,
            AuthError::InvalidToken => ErrorCode::InvalidToken,
            AuthError::InsufficientRole { .. } => ErrorCode::InsufficientRole,
            AuthError::NotOwner { .. } => ErrorCode::NotOwner,
            AuthError::InvalidCredentials => ErrorCode::InvalidCredentials,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::UserNotFound(id) => ApiError::not_found("User", &id),
            CoreError::OrderNotFound(id) => ApiError::not_found("Order", &id),
            CoreError::EmptyOrder => ApiError::new(ErrorCode::EmptyOrder, err.to_string()),
            CoreError::InvalidQuantity { .. } | CoreError::QuantityTooLarge { .. } => {
                ApiError::new(ErrorCode::InvalidQuantity, err.to_string())
            }
            CoreError::Auth(auth) => auth.into(),
            CoreError::Validation(validation) => validation.into(),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field } => {
                ApiError::new(ErrorCode::Conflict, format!("{} already exists", field))
            }
            DbError::PartialBatch {
                persisted,
                total,
                reason,
            } => {
                tracing::error!(persisted, total, %reason, "Checkout partially persisted");
                ApiError::new(
                    ErrorCode::PartialOrderBatch,
                    format!(
                        "Only {} of {} vendor orders were created; contact support",
                        persisted, total
                    ),
                )
            }
            DbError::ConnectionFailed(_) | DbError::PoolExhausted => {
                tracing::error!(error = %err, "Database unavailable");
                ApiError::new(ErrorCode::DatabaseError, "Database unavailable")
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_are_distinguishable() {
        let missing: ApiError = AuthError::MissingToken.into();
        let invalid: ApiError = AuthError::InvalidToken.into();
        let role: ApiError = AuthError::InsufficientRole {
            required: "admin".to_string(),
        }
        .into();
        let owner: ApiError = AuthError::NotOwner {
            resource: "product".to_string(),
            id: "p".to_string(),
        }
        .into();

        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(invalid.status(), StatusCode::FORBIDDEN);
        assert_eq!(role.status(), StatusCode::FORBIDDEN);
        assert_eq!(owner.status(), StatusCode::FORBIDDEN);
        assert_ne!(invalid.code, role.code);
        assert_ne!(role.code, owner.code);
    }

    #[test]
    fn test_core_error_mapping() {
        let err: ApiError = CoreError::ProductNotFound("p-9".to_string()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Product not found: p-9");

        let err: ApiError = CoreError::EmptyOrder.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code, ErrorCode::EmptyOrder);
    }

    #[test]
    fn test_db_error_mapping_hides_details() {
        let err: ApiError = DbError::duplicate("email").into();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err: ApiError = DbError::QueryFailed("syntax error near SELECT".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("SELECT"));

        let err: ApiError = DbError::PartialBatch {
            persisted: 1,
            total: 2,
            reason: "disk I/O error".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::PartialOrderBatch);
        assert!(!err.message.contains("disk"));
    }

    #[test]
    fn test_error_body_shape() {
        let json = serde_json::to_value(ApiError::new(ErrorCode::NotOwner, "nope")).unwrap();
        assert_eq!(json["code"], "NOT_OWNER");
        assert_eq!(json["message"], "nope");
    }
}
