//! # Error Types
//!
//! Domain-specific error types for bazaar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bazaar-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule failures (cart, lookups)         │
//! │  ├── AuthError        - Token and permission failures                  │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bazaar-db errors (separate crate)                                     │
//! │  └── DbError          - Store failures, partial batches                │
//! │                                                                         │
//! │  bazaar-api errors                                                     │
//! │  └── ApiError         - What the client sees (code + message)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → HTTP response          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A line item references a product that does not exist.
    ///
    /// ## When This Occurs
    /// - Product ID in the cart was never created
    /// - Product was deleted by its vendor after it was added to the cart
    ///
    /// The whole checkout aborts; no sub-order is created.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// User cannot be found.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Order cannot be found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Checkout was attempted with no line items.
    #[error("Order must contain at least one item")]
    EmptyOrder,

    /// A line item quantity is zero or negative.
    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: String, quantity: i64 },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Authentication or authorization failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Auth Error
// =============================================================================

/// Authentication and authorization failures.
///
/// Every variant is a distinct outcome so clients can tell "log in again"
/// apart from "you are not allowed to do this".
///
/// ```text
/// no / malformed header ──► MissingToken      (401)
/// bad / expired token   ──► InvalidToken      (403)
/// wrong role            ──► InsufficientRole  (403)
/// someone else's record ──► NotOwner          (403)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No bearer token was supplied.
    #[error("Token is required")]
    MissingToken,

    /// Token signature invalid, expired, or malformed.
    #[error("Invalid token")]
    InvalidToken,

    /// Caller's role does not satisfy the endpoint policy.
    #[error("Access denied: {required} only")]
    InsufficientRole { required: String },

    /// Caller does not own the addressed resource.
    #[error("Not authorized to modify {resource} {id}")]
    NotOwner { resource: String, id: String },

    /// Login failed: password does not match the stored credential.
    #[error("Invalid credentials")]
    InvalidCredentials,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Monetary computation does not fit in the amount type.
    #[error("{field} is too large")]
    Overflow { field: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
